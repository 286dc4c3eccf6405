use contracts::system::auth::UserRole;
use leptos::prelude::*;

use super::context::use_auth;

/// Показывает содержимое только пользователю с одной из ролей
#[component]
pub fn RequireRole(
    /// Допустимые роли; администратор допускается всегда
    roles: Vec<UserRole>,
    children: ChildrenFn,
) -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || {
                auth_state.with(|state| {
                    state.is_admin() || state.role().map(|r| roles.contains(&r)).unwrap_or(false)
                })
            }
            fallback=|| view! { <div class="page-error">"Доступ запрещён"</div> }
        >
            {children()}
        </Show>
    }
}
