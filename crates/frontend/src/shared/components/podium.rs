use leptos::prelude::*;

/// Место на пьедестале
#[derive(Debug, Clone, PartialEq)]
pub struct PodiumPlace {
    pub rank: u32,
    pub name: String,
    pub value: String,
}

/// Порядок вывода: второе место слева, первое по центру, третье справа
pub fn podium_order(places: &[PodiumPlace]) -> Vec<PodiumPlace> {
    match places {
        [first, second, third, ..] => vec![second.clone(), first.clone(), third.clone()],
        [first, second] => vec![second.clone(), first.clone()],
        _ => places.to_vec(),
    }
}

/// Пьедестал лучших (до трёх позиций)
#[component]
pub fn Podium(#[prop(into)] places: Signal<Vec<PodiumPlace>>) -> impl IntoView {
    view! {
        <div class="podium">
            {move || {
                podium_order(&places.get())
                    .into_iter()
                    .map(|p| {
                        let class = format!("podium__place podium__place--{}", p.rank.min(3));
                        view! {
                            <div class=class>
                                <div class="podium__rank">{p.rank}</div>
                                <div class="podium__name">{p.name}</div>
                                <div class="podium__value">{p.value}</div>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(rank: u32, name: &str) -> PodiumPlace {
        PodiumPlace {
            rank,
            name: name.into(),
            value: String::new(),
        }
    }

    #[test]
    fn test_podium_order() {
        let places = vec![place(1, "a"), place(2, "b"), place(3, "c")];
        let names: Vec<String> = podium_order(&places).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);

        let single = vec![place(1, "a")];
        assert_eq!(podium_order(&single).len(), 1);
    }
}
