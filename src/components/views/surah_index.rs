use crate::api::*;
use crate::components::{AppView, Icon};
use crate::config::{FIRST_PAGE, LAST_PAGE};
use dioxus::prelude::*;

fn matches_query(surah: &SurahSummary, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || surah.number.to_string() == query
        || surah.english_name.to_lowercase().contains(&query)
        || surah.english_name_translation.to_lowercase().contains(&query)
        || surah.name.contains(query.as_str())
}

#[component]
pub fn SurahIndexView() -> Element {
    let mut search = use_signal(String::new);
    let mut page_input = use_signal(|| FIRST_PAGE.to_string());
    let surahs = use_resource(|| async move { QuranClient::default().surah_list().await });

    let open_page = move |_| {
        let requested = page_input.peek().trim().parse::<u16>();
        match requested {
            Ok(page) if (FIRST_PAGE..=LAST_PAGE).contains(&page) => {
                navigator().push(AppView::PageReaderView { page });
            }
            _ => page_input.set(FIRST_PAGE.to_string()),
        }
    };

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header page-header--split",
                div {
                    h1 { class: "page-title", "Surahs" }
                    p { class: "page-subtitle", "The 114 chapters of the Quran" }
                }
                div { class: "flex gap-2",
                    input {
                        class: "w-24 px-3 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                        r#type: "number",
                        min: "{FIRST_PAGE}",
                        max: "{LAST_PAGE}",
                        value: "{page_input}",
                        oninput: move |evt| page_input.set(evt.value()),
                    }
                    button {
                        class: "px-3 py-2 rounded-xl bg-zinc-800 hover:bg-zinc-700 text-zinc-300 hover:text-white transition-colors flex items-center gap-2",
                        onclick: open_page,
                        Icon { name: "book".to_string(), class: "w-4 h-4".to_string() }
                        "Open page"
                    }
                }
            }

            div { class: "relative",
                Icon { name: "search".to_string(), class: "w-4 h-4 absolute left-3 top-3 text-zinc-500".to_string() }
                input {
                    class: "w-full pl-9 pr-4 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                    placeholder: "Search by name or number",
                    value: "{search}",
                    oninput: move |evt| search.set(evt.value()),
                }
            }

            match &*surahs.read_unchecked() {
                Some(Ok(list)) => {
                    let query = search();
                    let visible: Vec<SurahSummary> = list
                        .iter()
                        .filter(|surah| matches_query(surah, &query))
                        .cloned()
                        .collect();
                    rsx! {
                        if visible.is_empty() {
                            p { class: "text-zinc-500", "No surah matches \"{query}\"." }
                        }
                        div { class: "grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-3",
                            for surah in visible {
                                SurahCard { key: "{surah.number}", surah }
                            }
                        }
                    }
                }
                Some(Err(err)) => rsx! {
                    div { class: "flex flex-col items-center justify-center py-20",
                        Icon { name: "list".to_string(), class: "w-16 h-16 text-zinc-600 mb-4".to_string() }
                        h2 { class: "text-xl font-semibold text-white mb-2", "Could not load the surah list" }
                        p { class: "text-zinc-400 text-center max-w-md", "{err}" }
                    }
                },
                None => rsx! {
                    div { class: "flex items-center justify-center py-20",
                        Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
                    }
                },
            }
        }
    }
}

#[component]
fn SurahCard(surah: SurahSummary) -> Element {
    let number = surah.number;

    rsx! {
        button {
            class: "flex items-center gap-4 p-4 rounded-2xl bg-zinc-900/60 hover:bg-zinc-800/60 text-left transition-colors",
            onclick: move |_| {
                navigator().push(AppView::SurahReaderView { surah: number });
            },
            div { class: "w-10 h-10 rounded-xl bg-emerald-500/15 text-emerald-400 flex items-center justify-center font-semibold",
                "{surah.number}"
            }
            div { class: "flex-1 min-w-0",
                p { class: "text-white font-medium truncate", "{surah.english_name}" }
                p { class: "text-xs text-zinc-500 truncate",
                    "{surah.english_name_translation} · {surah.ayah_count} verses · {surah.revelation_type}"
                }
            }
            span { class: "text-lg text-zinc-300", dir: "rtl", "{surah.name}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baqarah() -> SurahSummary {
        SurahSummary {
            number: 2,
            name: "سُورَةُ البَقَرَةِ".to_string(),
            english_name: "Al-Baqara".to_string(),
            english_name_translation: "The Cow".to_string(),
            ayah_count: 286,
            revelation_type: "Medinan".to_string(),
        }
    }

    #[test]
    fn search_matches_number_and_names() {
        let surah = baqarah();
        assert!(matches_query(&surah, ""));
        assert!(matches_query(&surah, "2"));
        assert!(matches_query(&surah, "baq"));
        assert!(matches_query(&surah, "cow"));
        assert!(!matches_query(&surah, "22"));
        assert!(!matches_query(&surah, "fatiha"));
    }
}
