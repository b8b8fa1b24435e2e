use crate::components::{view_label, AppView, Icon, Sidebar};
use crate::db::{default_store, KeyValueStore};
use dioxus::prelude::*;
use std::rc::Rc;

/// Handle to the preference store, shared through context.
#[derive(Clone)]
pub struct Preferences(Rc<dyn KeyValueStore>);

impl Preferences {
    pub fn store(&self) -> &dyn KeyValueStore {
        self.0.as_ref()
    }

    pub fn shared(&self) -> Rc<dyn KeyValueStore> {
        Rc::clone(&self.0)
    }
}

#[component]
pub fn AppShell() -> Element {
    let preferences = use_hook(|| Preferences(default_store()));
    use_context_provider(|| preferences.clone());

    let sidebar_open = use_signal(|| false);
    let view = use_route::<AppView>();
    let can_go_back = !matches!(view, AppView::HomeView {});

    rsx! {
        div { class: "app-container flex min-h-screen text-white overflow-hidden",
            if sidebar_open() {
                div {
                    class: "fixed inset-0 bg-black/60 backdrop-blur-sm z-30 2xl:hidden",
                    onclick: {
                        let mut sidebar_open = sidebar_open;
                        move |_| sidebar_open.set(false)
                    },
                }
            }

            Sidebar { sidebar_open }

            // Main content area
            div { class: "flex-1 flex flex-col overflow-hidden",
                header { class: "mobile-safe-top 2xl:hidden border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
                    div { class: "flex items-center justify-between px-4 py-3",
                        if can_go_back {
                            button {
                                class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60 transition-colors",
                                aria_label: "Go back",
                                onclick: move |_| {
                                    let nav = navigator();
                                    if nav.can_go_back() {
                                        nav.go_back();
                                    } else {
                                        nav.replace(AppView::HomeView {});
                                    }
                                },
                                Icon {
                                    name: "arrow-left".to_string(),
                                    class: "w-5 h-5".to_string(),
                                }
                            }
                        } else {
                            button {
                                class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60 transition-colors",
                                aria_label: "Open menu",
                                onclick: {
                                    let mut sidebar_open = sidebar_open;
                                    move |_| sidebar_open.set(true)
                                },
                                Icon {
                                    name: "menu".to_string(),
                                    class: "w-5 h-5".to_string(),
                                }
                            }
                        }
                        div { class: "flex flex-col items-center text-center",
                            span { class: "text-xs uppercase tracking-widest text-zinc-500",
                                "Ramadan Companion"
                            }
                            span { class: "text-sm font-semibold text-white", "{view_label(&view)}" }
                        }
                        button {
                            class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60 transition-colors",
                            aria_label: "Prayer times",
                            onclick: move |_| {
                                navigator().push(AppView::PrayerTimesView {});
                            },
                            Icon {
                                name: "clock".to_string(),
                                class: "w-5 h-5".to_string(),
                            }
                        }
                    }
                }

                // Main scrollable content
                main { class: "flex-1 overflow-y-auto main-scroll",
                    div { class: "page-shell", Outlet::<AppView> {} }
                }
            }
        }
    }
}
