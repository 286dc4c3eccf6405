use crate::dashboards::{
    BillingDashboard, EconomicsDashboard, PipelineDashboard, TechnicianPortal,
    TechnicianRankingDashboard,
};
use crate::domain::a001_contract::hook::provide_contracts;
use crate::domain::a001_contract::ui::ContractList;
use crate::layout::global_context::AppGlobalContext;
use crate::layout::nav::{self, resolve_page, NavItem};
use crate::layout::Shell;
use crate::system::auth::context::use_auth;
use crate::system::auth::guard::RequireRole;
use crate::system::pages::login::LoginPage;
use leptos::prelude::*;

fn page_view(key: &str) -> AnyView {
    match key {
        nav::D400_ECONOMICS => view! { <EconomicsDashboard /> }.into_any(),
        nav::D401_BILLING => view! { <BillingDashboard /> }.into_any(),
        nav::D402_CONTRACT_PIPELINE => view! { <PipelineDashboard /> }.into_any(),
        nav::D403_TECHNICIAN_RANKING => view! { <TechnicianRankingDashboard /> }.into_any(),
        nav::D404_TECHNICIAN_PORTAL => view! { <TechnicianPortal /> }.into_any(),
        nav::A001_CONTRACT => view! { <ContractList /> }.into_any(),
        _ => view! { <div class="page-error">"Страница не найдена"</div> }.into_any(),
    }
}

fn render_page(item: NavItem) -> AnyView {
    view! {
        <RequireRole roles=item.roles()>
            {page_view(item.key)}
        </RequireRole>
    }
    .into_any()
}

#[component]
fn MainLayout() -> impl IntoView {
    let ctx = use_context::<AppGlobalContext>().expect("AppGlobalContext context not found");
    let (auth_state, _) = use_auth();

    // Initialize router integration. This runs once when the component is created.
    ctx.init_router_integration();
    provide_contracts();

    // доступная страница; пересоздаётся только при смене ключа
    let current = Memo::new(move |_| {
        let role = auth_state.with(|a| a.role())?;
        ctx.page.with(|p| resolve_page(role, p.as_deref()))
    });

    Effect::new(move |_| {
        if let Some(item) = current.get() {
            if ctx.page.with_untracked(|p| p.as_deref() != Some(item.key)) {
                ctx.open_page(item.key);
            }
        }
    });

    view! {
        <Shell>
            {move || match current.get() {
                Some(item) => render_page(item),
                None => view! { <div class="page-empty">"Нет доступных страниц"</div> }.into_any(),
            }}
        </Shell>
    }
}

#[component]
pub fn AppRoutes() -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || !auth_state.with(|a| a.restoring)
            fallback=|| view! { <div class="page-loading">"Восстановление сессии..."</div> }
        >
            <Show
                when=move || auth_state.with(|a| a.is_authenticated())
                fallback=|| view! { <LoginPage /> }
            >
                <MainLayout />
            </Show>
        </Show>
    }
}
