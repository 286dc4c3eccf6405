//! Верхняя панель: название, переключатель навигации, пользователь и выход

use crate::layout::global_context::AppGlobalContext;
use crate::shared::icons::icon;
use crate::system::auth::context::{do_logout, use_auth};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn TopHeader() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");
    let (auth_state, set_auth_state) = use_auth();

    let logout = move |_| {
        spawn_local(async move {
            do_logout(set_auth_state).await;
        });
    };

    let user_line = move || {
        auth_state.with(|s| {
            s.user_info
                .as_ref()
                .map(|u| {
                    let name = u.full_name.clone().unwrap_or_else(|| u.username.clone());
                    format!("{} · {}", name, u.role.label())
                })
                .unwrap_or_default()
        })
    };

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <button
                    class="top-header__icon-btn"
                    on:click=move |_| ctx.toggle_sidebar()
                    title=move || if ctx.sidebar_open.get() { "Скрыть навигацию" } else { "Показать навигацию" }
                >
                    "☰"
                </button>
                <span class="top-header__title">"Pestdesk"</span>
            </div>

            <div class="top-header__actions">
                <span class="top-header__user">{user_line}</span>
                <button class="top-header__icon-btn" on:click=logout title="Выйти">
                    {icon("logout")}
                </button>
            </div>
        </div>
    }
}
