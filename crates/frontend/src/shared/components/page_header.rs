use leptos::prelude::*;

/// Заголовок страницы с подзаголовком и областью действий справа
#[component]
pub fn PageHeader(
    #[prop(into)]
    title: String,

    #[prop(optional, into)]
    subtitle: MaybeProp<String>,

    /// Кнопки и фильтры справа
    children: Children,
) -> impl IntoView {
    view! {
        <div class="page-header">
            <div class="page-header__content">
                <div class="page-header__text">
                    <h1 class="page-header__title">{title}</h1>
                    {move || subtitle.get().map(|s| view! {
                        <div class="page-header__subtitle">{s}</div>
                    })}
                </div>
            </div>
            <div class="page-header__actions">
                {children()}
            </div>
        </div>
    }
}

/// Состояние загрузки/ошибки страницы
#[component]
pub fn LoadState(
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] error: Signal<Option<String>>,
) -> impl IntoView {
    view! {
        <Show when=move || loading.get()>
            <div class="page-loading">"Загрузка данных..."</div>
        </Show>
        {move || error.get().map(|err| view! {
            <div class="page-error">
                <strong>"Ошибка: "</strong>
                {err}
            </div>
        })}
    }
}
