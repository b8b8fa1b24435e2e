use super::today_at;
use crate::api::*;
use crate::components::{current_position, delay_ms, Icon, Preferences};
use crate::db::{load_prayer_location, load_prayer_method, save_prayer_location, save_prayer_method};
use chrono::{Datelike, Local, NaiveDateTime};
use dioxus::prelude::*;

/// Wall clock for countdowns, refreshed every second.
pub(super) fn use_clock() -> Signal<NaiveDateTime> {
    let mut now = use_signal(|| Local::now().naive_local());
    use_hook(move || {
        spawn(async move {
            loop {
                delay_ms(1000).await;
                now.set(Local::now().naive_local());
            }
        })
    });
    now
}

#[component]
pub fn PrayerTimesView() -> Element {
    let preferences = use_context::<Preferences>();
    let mut location = use_signal(|| load_prayer_location(preferences.store()));
    let mut method = use_signal(|| load_prayer_method(preferences.store()));
    let mut coordinates = use_signal(|| None::<(f64, f64)>);
    let mut draft = use_signal(|| location.peek().clone());
    let mut locating = use_signal(|| false);
    let mut notice = use_signal(|| None::<String>);
    let now = use_clock();

    let day = use_resource(move || {
        let location = location();
        let method = method();
        let coordinates = coordinates();
        async move {
            match coordinates {
                Some((latitude, longitude)) => {
                    let query = PrayerQuery::new(Local::now().date_naive()).with_method(method);
                    PrayerClient::default()
                        .timings_by_coordinates(latitude, longitude, &query)
                        .await
                }
                None => today_at(&location, method).await,
            }
        }
    });

    // Month view needs coordinates, so it only appears after a device fix.
    let month = use_resource(move || {
        let coordinates = coordinates();
        let method = method();
        async move {
            let Some((latitude, longitude)) = coordinates else {
                return Ok(Vec::new());
            };
            let today = Local::now().date_naive();
            PrayerClient::default()
                .calendar(today.year(), today.month(), latitude, longitude, method)
                .await
        }
    });

    let apply_location = {
        let preferences = preferences.clone();
        move |_| {
            let value = draft.peek().trim().to_string();
            if value.is_empty() {
                return;
            }
            if let Err(err) = save_prayer_location(preferences.store(), &value) {
                tracing::warn!("Could not save prayer location: {err}");
            }
            coordinates.set(None);
            notice.set(None);
            location.set(value);
        }
    };

    let use_device_location = {
        let preferences = preferences.clone();
        move |_| {
            if locating() {
                return;
            }
            locating.set(true);
            let preferences = preferences.clone();
            spawn(async move {
                match current_position().await {
                    Ok((latitude, longitude)) => {
                        let name = match GeocodeClient::default().reverse(latitude, longitude).await {
                            Ok(place) => place.name,
                            Err(err) => {
                                tracing::warn!("Reverse geocoding failed: {err}");
                                format!("{latitude:.4}, {longitude:.4}")
                            }
                        };
                        if let Err(err) = save_prayer_location(preferences.store(), &name) {
                            tracing::warn!("Could not save prayer location: {err}");
                        }
                        draft.set(name.clone());
                        location.set(name);
                        coordinates.set(Some((latitude, longitude)));
                        notice.set(None);
                    }
                    Err(err) => {
                        tracing::info!("Falling back to saved location: {err}");
                        notice.set(Some(format!(
                            "{err}. Showing times for {}.",
                            location.peek()
                        )));
                    }
                }
                locating.set(false);
            });
        }
    };

    let on_method_change = {
        let preferences = preferences.clone();
        move |evt: FormEvent| {
            let Ok(id) = evt.value().parse::<u8>() else {
                return;
            };
            if let Err(err) = save_prayer_method(preferences.store(), id) {
                tracing::warn!("Could not save calculation method: {err}");
            }
            method.set(id);
        }
    };

    let selected_method = method();
    let method_angles = calculation_method(selected_method).map(|entry| entry.angles);

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header page-header--split",
                div {
                    h1 { class: "page-title", "Prayer Times" }
                    p { class: "page-subtitle", "{location}" }
                }
                button {
                    class: "px-3 py-2 rounded-xl bg-zinc-800 hover:bg-zinc-700 text-zinc-300 hover:text-white transition-colors flex items-center gap-2",
                    disabled: locating(),
                    onclick: use_device_location,
                    if locating() {
                        Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                    } else {
                        Icon { name: "map-pin".to_string(), class: "w-4 h-4".to_string() }
                    }
                    "Use my location"
                }
            }

            div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                div { class: "flex gap-2",
                    input {
                        class: "flex-1 px-4 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                        placeholder: "City, Country",
                        value: "{draft}",
                        oninput: move |evt| draft.set(evt.value()),
                    }
                    button {
                        class: "px-4 py-2 rounded-xl bg-emerald-500 hover:bg-emerald-400 text-white font-medium transition-colors",
                        onclick: apply_location,
                        "Apply"
                    }
                }
                select {
                    class: "px-4 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                    onchange: on_method_change,
                    for entry in CALCULATION_METHODS.iter() {
                        option {
                            value: "{entry.id}",
                            selected: entry.id == selected_method,
                            "{entry.name}"
                        }
                    }
                }
            }

            if let Some(angles) = method_angles {
                p { class: "text-xs text-zinc-500", "{angles}" }
            }

            if let Some(message) = notice() {
                p { class: "text-sm text-amber-400", "{message}" }
            }

            match &*day.read_unchecked() {
                Some(Ok(day)) => {
                    let next = next_prayer(&day.timings, now());
                    rsx! {
                        PrayerDayCard { day: day.clone(), next }
                    }
                }
                Some(Err(err)) => rsx! {
                    div { class: "flex flex-col items-center justify-center py-20",
                        Icon { name: "clock".to_string(), class: "w-16 h-16 text-zinc-600 mb-4".to_string() }
                        h2 { class: "text-xl font-semibold text-white mb-2", "Prayer times unavailable" }
                        p { class: "text-zinc-400 text-center max-w-md", "{err}" }
                    }
                },
                None => rsx! {
                    div { class: "flex items-center justify-center py-20",
                        Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
                    }
                },
            }

            match &*month.read_unchecked() {
                Some(Ok(days)) if !days.is_empty() => rsx! {
                    section { class: "space-y-3",
                        h2 { class: "text-lg font-semibold text-white", "This month" }
                        div { class: "overflow-x-auto rounded-2xl bg-zinc-900/60",
                            table { class: "w-full text-sm text-zinc-300",
                                for day in days.iter() {
                                    tr { key: "{day.gregorian_date}", class: "border-t border-zinc-800/60",
                                        td { class: "px-4 py-2", "{day.readable_date}" }
                                        td { class: "px-4 py-2", "{format_prayer_time(&day.timings.fajr)}" }
                                        td { class: "px-4 py-2", "{format_prayer_time(&day.timings.maghrib)}" }
                                        td { class: "px-4 py-2", "{format_prayer_time(&day.timings.isha)}" }
                                    }
                                }
                            }
                        }
                    }
                },
                Some(Err(err)) => rsx! {
                    p { class: "text-sm text-zinc-500", "Monthly times unavailable: {err}" }
                },
                _ => rsx! {},
            }
        }
    }
}

#[component]
pub(super) fn PrayerDayCard(day: PrayerDay, next: Option<NextPrayer>) -> Element {
    let next_name = next.as_ref().map(|next| next.name);

    rsx! {
        div { class: "space-y-4",
            div { class: "flex flex-wrap items-baseline justify-between gap-2",
                p { class: "text-zinc-300", "{day.weekday}, {day.readable_date}" }
                p { class: "text-emerald-400", "{day.hijri_day} {day.hijri_month} {day.hijri_year} AH" }
            }

            if let Some(next) = next.as_ref() {
                div { class: "rounded-2xl bg-gradient-to-r from-emerald-500/20 to-teal-500/10 p-6",
                    p { class: "text-xs uppercase tracking-widest text-emerald-300", "Next prayer" }
                    div { class: "flex items-baseline justify-between mt-2",
                        h2 { class: "text-2xl font-bold text-white", "{next.name}" }
                        span { class: "text-lg text-zinc-200", "{format_prayer_time(&next.time)}" }
                    }
                    p { class: "text-sm text-zinc-300 mt-1 font-mono", "in {next.remaining}" }
                }
            }

            ul { class: "divide-y divide-zinc-800/60 rounded-2xl bg-zinc-900/60",
                for (name, time) in day.timings.daily() {
                    li {
                        key: "{name}",
                        class: if Some(name) == next_name { "flex justify-between px-5 py-3 text-emerald-400" } else { "flex justify-between px-5 py-3 text-zinc-300" },
                        span { "{name}" }
                        span { "{format_prayer_time(time)}" }
                    }
                }
            }

            if !day.timezone.is_empty() {
                p { class: "text-xs text-zinc-500", "Times shown in {day.timezone}" }
            }
        }
    }
}
