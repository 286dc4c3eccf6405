//! Боковая навигация: только страницы, доступные роли пользователя

use crate::layout::global_context::AppGlobalContext;
use crate::layout::nav::{items_for, resolve_page};
use crate::shared::icons::icon;
use crate::system::auth::context::use_auth;
use leptos::prelude::*;

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext not found");
    let (auth_state, _) = use_auth();

    let items = move || {
        auth_state
            .with(|s| s.role())
            .map(items_for)
            .unwrap_or_default()
    };

    let active_key = move || {
        let role = auth_state.with(|s| s.role())?;
        resolve_page(role, ctx.page.get().as_deref()).map(|i| i.key)
    };

    view! {
        <nav class="sidebar" class:sidebar--collapsed=move || !ctx.sidebar_open.get()>
            <For
                each=items
                key=|item| item.key
                children=move |item| {
                    let is_active = move || active_key() == Some(item.key);
                    view! {
                        <button
                            class="sidebar__item"
                            class:sidebar__item--active=is_active
                            on:click=move |_| ctx.open_page(item.key)
                        >
                            <span class="sidebar__icon">{icon(item.icon)}</span>
                            <span class="sidebar__label">{item.title}</span>
                        </button>
                    }
                }
            />
        </nav>
    }
}
