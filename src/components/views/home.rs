use super::prayer_times::use_clock;
use super::today_at;
use crate::api::*;
use crate::components::{AppView, Icon, Preferences};
use crate::db::{load_bookmarks, load_prayer_location, load_prayer_method, load_progress};
use dioxus::prelude::*;

#[component]
pub fn HomeView() -> Element {
    let preferences = use_context::<Preferences>();
    let location = use_hook(|| load_prayer_location(preferences.store()));
    let method = use_hook(|| load_prayer_method(preferences.store()));
    let progress = load_progress(preferences.store());
    let bookmarks = load_bookmarks(preferences.store());
    let now = use_clock();

    let today = use_resource({
        let location = location.clone();
        move || {
            let location = location.clone();
            async move { today_at(&location, method).await }
        }
    });

    let resume_target = progress.map(|marker| match marker.locator {
        Locator::Page(page) => (AppView::PageReaderView { page }, format!("Page {page}")),
        Locator::Surah(surah) => (AppView::SurahReaderView { surah }, format!("Surah {surah}")),
    });

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Ramadan Mubarak" }
                p { class: "page-subtitle", "{location}" }
            }

            match &*today.read_unchecked() {
                Some(Ok(day)) => {
                    let next = next_prayer(&day.timings, now());
                    rsx! {
                        div { class: "rounded-2xl bg-gradient-to-r from-emerald-500/20 to-teal-500/10 p-6 space-y-2",
                            p { class: "text-sm text-emerald-300", "{day.hijri_day} {day.hijri_month} {day.hijri_year} AH" }
                            if let Some(next) = next {
                                div { class: "flex items-baseline justify-between",
                                    h2 { class: "text-2xl font-bold text-white", "{next.name}" }
                                    span { class: "text-lg text-zinc-200", "{format_prayer_time(&next.time)}" }
                                }
                                p { class: "text-sm text-zinc-300 font-mono", "in {next.remaining}" }
                            }
                            div { class: "flex gap-6 text-sm text-zinc-300 pt-2",
                                span { "Suhoor ends {format_prayer_time(day.timings.suhoor())}" }
                                span { "Iftar {format_prayer_time(&day.timings.maghrib)}" }
                            }
                        }
                    }
                }
                Some(Err(err)) => rsx! {
                    p { class: "text-zinc-400", "Prayer times unavailable: {err}" }
                },
                None => rsx! {
                    div { class: "flex items-center gap-2 text-zinc-500",
                        Icon { name: "loader".to_string(), class: "w-5 h-5".to_string() }
                        "Loading today's times"
                    }
                },
            }

            div { class: "grid grid-cols-2 md:grid-cols-4 gap-4",
                QuickLink { icon: "clock", label: "Prayer Times", target: AppView::PrayerTimesView {} }
                QuickLink { icon: "moon", label: "Ramadan Calendar", target: AppView::RamadanCalendarView {} }
                QuickLink { icon: "list", label: "Surahs", target: AppView::SurahIndexView {} }
                QuickLink { icon: "book", label: "Read by Page", target: AppView::PageReaderView { page: 1 } }
            }

            if let Some((target, label)) = resume_target {
                button {
                    class: "w-full flex items-center justify-between px-5 py-4 rounded-2xl bg-zinc-900/60 hover:bg-zinc-800/60 transition-colors",
                    onclick: move |_| {
                        navigator().push(target.clone());
                    },
                    div { class: "flex items-center gap-3",
                        Icon { name: "book".to_string(), class: "w-5 h-5 text-emerald-400".to_string() }
                        span { class: "text-white", "Continue reading" }
                    }
                    span { class: "text-zinc-400", "{label}" }
                }
            }

            section { class: "space-y-3",
                h2 { class: "text-lg font-semibold text-white", "Bookmarks" }
                if bookmarks.is_empty() {
                    p { class: "text-zinc-500 text-sm", "Bookmark a verse while reading to find it here." }
                } else {
                    div { class: "flex flex-wrap gap-2",
                        for id in bookmarks {
                            button {
                                key: "{id}",
                                class: "px-3 py-1.5 rounded-xl bg-zinc-800 hover:bg-zinc-700 text-zinc-200 text-sm flex items-center gap-2",
                                onclick: move |_| {
                                    navigator().push(AppView::SurahReaderView { surah: id.surah });
                                },
                                Icon { name: "bookmark-filled".to_string(), class: "w-4 h-4 text-emerald-400".to_string() }
                                "{id}"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn QuickLink(icon: String, label: String, target: AppView) -> Element {
    rsx! {
        button {
            class: "flex flex-col items-center gap-2 p-5 rounded-2xl bg-zinc-900/60 hover:bg-zinc-800/60 text-zinc-300 hover:text-white transition-colors",
            onclick: move |_| {
                navigator().push(target.clone());
            },
            Icon { name: icon.clone(), class: "w-6 h-6".to_string() }
            span { class: "text-sm", "{label}" }
        }
    }
}
