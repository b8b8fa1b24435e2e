use super::today_at;
use crate::api::*;
use crate::components::{Icon, Preferences};
use crate::db::{load_prayer_location, load_prayer_method};
use dioxus::prelude::*;

/// Suhoor and iftar table for the current (or next) Ramadan at the saved
/// location.
async fn load_ramadan(address: String, method: u8) -> Result<(u16, Vec<RamadanDay>), ApiError> {
    let today = today_at(&address, method).await?;
    let hijri_year = today
        .hijri_year
        .trim()
        .parse::<u16>()
        .map_err(|_| ApiError::Decode(format!("unexpected hijri year `{}`", today.hijri_year)))?;
    let year = upcoming_ramadan_year(hijri_year, today.hijri_month_number);
    let days = PrayerClient::default()
        .ramadan_calendar(year, &address, method)
        .await?;
    Ok((year, days))
}

#[component]
pub fn RamadanCalendarView() -> Element {
    let preferences = use_context::<Preferences>();
    let location = use_hook(|| load_prayer_location(preferences.store()));
    let method = use_hook(|| load_prayer_method(preferences.store()));
    let today = chrono::Local::now().format("%d-%m-%Y").to_string();

    let mut calendar = use_resource({
        let location = location.clone();
        move || load_ramadan(location.clone(), method)
    });

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Ramadan Calendar" }
                p { class: "page-subtitle", "{location}" }
            }

            match &*calendar.read_unchecked() {
                Some(Ok((year, days))) => rsx! {
                    p { class: "text-zinc-400", "Ramadan {year} AH" }
                    div { class: "overflow-x-auto rounded-2xl bg-zinc-900/60",
                        table { class: "w-full text-sm",
                            thead {
                                tr { class: "text-left text-zinc-500 uppercase text-xs tracking-wider",
                                    th { class: "px-4 py-3", "Day" }
                                    th { class: "px-4 py-3", "Date" }
                                    th { class: "px-4 py-3", "Suhoor" }
                                    th { class: "px-4 py-3", "Dhuhr" }
                                    th { class: "px-4 py-3", "Asr" }
                                    th { class: "px-4 py-3", "Iftar" }
                                    th { class: "px-4 py-3", "Isha" }
                                }
                            }
                            tbody {
                                for day in days.iter() {
                                    tr {
                                        key: "{day.day}",
                                        class: if day.date == today { "border-t border-zinc-800/60 text-emerald-400" } else { "border-t border-zinc-800/60 text-zinc-300" },
                                        td { class: "px-4 py-3", "{day.day}" }
                                        td { class: "px-4 py-3", "{day.weekday} {day.date}" }
                                        td { class: "px-4 py-3", "{day.suhoor}" }
                                        td { class: "px-4 py-3", "{day.dhuhr}" }
                                        td { class: "px-4 py-3", "{day.asr}" }
                                        td { class: "px-4 py-3 font-semibold", "{day.iftar}" }
                                        td { class: "px-4 py-3", "{day.isha}" }
                                    }
                                }
                            }
                        }
                    }
                },
                Some(Err(err)) => rsx! {
                    div { class: "flex flex-col items-center justify-center py-20",
                        Icon { name: "moon".to_string(), class: "w-16 h-16 text-zinc-600 mb-4".to_string() }
                        h2 { class: "text-xl font-semibold text-white mb-2", "Calendar unavailable" }
                        p { class: "text-zinc-400 text-center max-w-md", "{err}" }
                        button {
                            class: "mt-6 px-6 py-3 bg-emerald-500 hover:bg-emerald-400 text-white font-medium rounded-xl transition-colors",
                            onclick: move |_| calendar.restart(),
                            "Try again"
                        }
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
