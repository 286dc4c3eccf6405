use contracts::system::auth::{UserInfo, UserRole};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{api, storage};

#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub user_info: Option<UserInfo>,
    /// Восстановление сессии из localStorage ещё идёт
    pub restoring: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user_info.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user_info.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.user_info.as_ref().map(|u| u.is_admin()).unwrap_or(false)
    }
}

/// Восстановить сессию: проверить access token, при неудаче обновить его по refresh token
async fn restore_session() -> Option<AuthState> {
    let access_token = storage::get_access_token()?;
    if let Ok(user_info) = api::get_current_user(&access_token).await {
        return Some(AuthState {
            access_token: Some(access_token),
            user_info: Some(user_info),
            restoring: false,
        });
    }

    let refresh_token = storage::get_refresh_token()?;
    match api::refresh_token(refresh_token).await {
        Ok(response) => {
            storage::save_access_token(&response.access_token);
            let user_info = api::get_current_user(&response.access_token).await.ok()?;
            Some(AuthState {
                access_token: Some(response.access_token),
                user_info: Some(user_info),
                restoring: false,
            })
        }
        Err(e) => {
            log::info!("Session expired: {}", e);
            None
        }
    }
}

/// Auth context provider component
#[component]
pub fn AuthProvider(children: ChildrenFn) -> impl IntoView {
    let (auth_state, set_auth_state) = signal(AuthState {
        restoring: storage::get_access_token().is_some(),
        ..Default::default()
    });

    Effect::new(move |_| {
        spawn_local(async move {
            match restore_session().await {
                Some(state) => set_auth_state.set(state),
                None => {
                    storage::clear_tokens();
                    set_auth_state.set(AuthState::default());
                }
            }
        });
    });

    provide_context(auth_state);
    provide_context(set_auth_state);

    children()
}

/// Hook to access auth state
pub fn use_auth() -> (ReadSignal<AuthState>, WriteSignal<AuthState>) {
    let auth_state =
        use_context::<ReadSignal<AuthState>>().expect("AuthProvider not found in component tree");
    let set_auth_state =
        use_context::<WriteSignal<AuthState>>().expect("AuthProvider not found in component tree");

    (auth_state, set_auth_state)
}

/// Выполнить вход и сохранить токены
pub async fn do_login(
    username: String,
    password: String,
    set_auth_state: WriteSignal<AuthState>,
) -> Result<(), String> {
    let response = api::login(username, password).await?;

    storage::save_access_token(&response.access_token);
    storage::save_refresh_token(&response.refresh_token);

    set_auth_state.set(AuthState {
        access_token: Some(response.access_token),
        user_info: Some(response.user),
        restoring: false,
    });
    Ok(())
}

/// Выход: отзыв refresh token и очистка состояния
pub async fn do_logout(set_auth_state: WriteSignal<AuthState>) {
    if let Some(refresh_token) = storage::get_refresh_token() {
        if let Err(e) = api::logout(refresh_token).await {
            log::warn!("Logout request failed: {}", e);
        }
    }
    storage::clear_tokens();
    set_auth_state.set(AuthState::default());
}
