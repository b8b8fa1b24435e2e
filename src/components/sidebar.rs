use crate::components::{AppView, Icon, Preferences};
use crate::db::load_prayer_location;
use dioxus::prelude::*;

#[component]
pub fn Sidebar(sidebar_open: Signal<bool>) -> Element {
    let preferences = use_context::<Preferences>();
    let view = use_route::<AppView>();
    let location = load_prayer_location(preferences.store());

    let mut go = move |target: AppView| {
        sidebar_open.set(false);
        navigator().push(target);
    };

    let visibility = if sidebar_open() {
        "translate-x-0"
    } else {
        "-translate-x-full 2xl:translate-x-0"
    };

    rsx! {
        aside { class: "fixed 2xl:static inset-y-0 left-0 z-40 w-64 bg-zinc-950/50 border-r border-zinc-800/50 flex flex-col h-full backdrop-blur-xl transition-transform {visibility}",
            // Logo
            div { class: "p-6 border-b border-zinc-800/50",
                div { class: "flex items-center gap-3",
                    div { class: "w-10 h-10 rounded-xl bg-gradient-to-br from-emerald-500 to-teal-600 flex items-center justify-center text-white shadow-lg shadow-emerald-500/20",
                        Icon { name: "moon".to_string(), class: "w-5 h-5".to_string() }
                    }
                    div {
                        h1 { class: "text-lg font-bold text-white", "Ramadan Companion" }
                        p { class: "text-xs text-zinc-500 truncate", "{location}" }
                    }
                }
            }

            nav { class: "flex-1 overflow-y-auto p-4 space-y-1",
                div { class: "mb-6",
                    p { class: "text-xs font-semibold text-zinc-500 uppercase tracking-wider mb-3 px-3",
                        "Today"
                    }
                    NavItem {
                        icon: "home",
                        label: "Home",
                        active: matches!(view, AppView::HomeView {}),
                        onclick: move |_| go(AppView::HomeView {}),
                    }
                    NavItem {
                        icon: "clock",
                        label: "Prayer Times",
                        active: matches!(view, AppView::PrayerTimesView {}),
                        onclick: move |_| go(AppView::PrayerTimesView {}),
                    }
                    NavItem {
                        icon: "moon",
                        label: "Ramadan Calendar",
                        active: matches!(view, AppView::RamadanCalendarView {}),
                        onclick: move |_| go(AppView::RamadanCalendarView {}),
                    }
                }

                div { class: "mb-6",
                    p { class: "text-xs font-semibold text-zinc-500 uppercase tracking-wider mb-3 px-3",
                        "Quran"
                    }
                    NavItem {
                        icon: "list",
                        label: "Surahs",
                        active: matches!(view, AppView::SurahIndexView {} | AppView::SurahReaderView { .. }),
                        onclick: move |_| go(AppView::SurahIndexView {}),
                    }
                    NavItem {
                        icon: "book",
                        label: "Read by Page",
                        active: matches!(view, AppView::PageReaderView { .. }),
                        onclick: move |_| go(AppView::PageReaderView { page: 1 }),
                    }
                }
            }
        }
    }
}

#[component]
fn NavItem(icon: String, label: String, active: bool, onclick: EventHandler<MouseEvent>) -> Element {
    let base_class = "flex items-center gap-3 px-3 py-2.5 rounded-xl text-sm font-medium transition-all duration-200 cursor-pointer";
    let active_class = if active {
        "bg-gradient-to-r from-emerald-500/20 to-teal-500/10 text-emerald-400 shadow-sm"
    } else {
        "text-zinc-400 hover:text-white hover:bg-zinc-800/50"
    };

    rsx! {
        button {
            class: "{base_class} {active_class} w-full",
            onclick: move |e| onclick.call(e),
            Icon { name: icon.clone(), class: "w-5 h-5".to_string() }
            span { "{label}" }
        }
    }
}
