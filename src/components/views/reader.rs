use crate::api::*;
use crate::components::{platform_sink, AppView, AudioController, Icon, Preferences};
use crate::db::load_progress;
use crate::reader::{LoadTicket, PlaybackStatus, ReadingSession, RepeatMode};
use dioxus::prelude::*;

#[component]
pub fn SurahReaderView(surah: u16) -> Element {
    rsx! {
        ReaderScreen { locator: Locator::Surah(surah) }
    }
}

#[component]
pub fn PageReaderView(page: u16) -> Element {
    rsx! {
        ReaderScreen { locator: Locator::Page(page) }
    }
}

/// Runs the fetch for `ticket` and hands the result back to the session,
/// which discards it if a later load has started meanwhile.
fn start_fetch(mut session: Signal<ReadingSession>, ticket: LoadTicket) {
    spawn(async move {
        let result = QuranClient::default().fetch_verses(&ticket.request).await;
        session.write().apply_load(ticket.generation, result);
    });
}

fn begin_load(
    session: &mut ReadingSession,
    locator: Locator,
    resume: bool,
) -> Result<Option<LoadTicket>, crate::reader::ReaderError> {
    if resume {
        if let Some(ticket) = session.resume_progress() {
            return Ok(Some(ticket));
        }
    }
    let reciter = session.state().reciter.clone();
    let ticket = match locator {
        Locator::Page(page) => session.begin_load_page(page, &reciter)?,
        Locator::Surah(surah) => session.begin_load_surah(surah, &reciter)?,
    };
    Ok(Some(ticket))
}

fn repeat_mode_value(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "none",
        RepeatMode::Verse => "verse",
        RepeatMode::Set => "set",
    }
}

fn repeat_mode_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "No repeat",
        RepeatMode::Verse => "Repeat verse",
        RepeatMode::Set => "Repeat all",
    }
}

fn parse_repeat_mode(value: &str) -> RepeatMode {
    match value {
        "verse" => RepeatMode::Verse,
        "set" => RepeatMode::Set,
        _ => RepeatMode::None,
    }
}

#[component]
fn ReaderScreen(locator: Locator) -> Element {
    let preferences = use_context::<Preferences>();
    let mut session = use_signal({
        let store = preferences.shared();
        move || ReadingSession::new(platform_sink(), store)
    });
    let mut notice = use_signal(|| None::<String>);
    let reciters = use_resource(|| async move { QuranClient::default().audio_editions().await });
    let translations =
        use_resource(|| async move { QuranClient::default().translation_editions().await });

    // (Re)load whenever the route points somewhere the session is not.
    use_effect(use_reactive!(|(locator,)| {
        if session.peek().state().locator == Some(locator) {
            return;
        }
        let resume = load_progress(preferences.store())
            .map(|marker| marker.locator == locator)
            .unwrap_or(false);
        let result = begin_load(&mut session.write(), locator, resume);
        match result {
            Ok(Some(ticket)) => start_fetch(session, ticket),
            Ok(None) => {}
            Err(err) => notice.set(Some(err.to_string())),
        }
    }));

    use_drop(move || {
        if let Ok(mut session) = session.try_write() {
            session.detach();
        }
    });

    // Keep the verse being recited in view.
    let mut scrolled_to = use_signal(|| None::<usize>);
    use_effect(move || {
        let cursor = session.read().state().cursor;
        if cursor == *scrolled_to.peek() {
            return;
        }
        scrolled_to.set(cursor);
        if let Some(index) = cursor {
            let _ = document::eval(&format!(
                r#"document.getElementById("verse-{index}")?.scrollIntoView({{ block: "center", behavior: "smooth" }});"#
            ));
        }
    });

    let state = session.read().state().clone();
    let bookmarks = session.read().bookmarks().clone();
    let verse_count = state.verses.len();
    let cursor = state.cursor;
    let is_playing = state.is_playing();
    let busy = state.loading;

    let mut play_index = move |index: usize| {
        let result = session.write().play_verse(index);
        if let Err(err) = result {
            notice.set(Some(err.to_string()));
        }
    };

    let on_toggle = move |_| {
        let needs_start = session.peek().state().cursor.is_none();
        if needs_start {
            play_index(0);
        } else {
            session.write().toggle_play_pause();
        }
    };

    let mut step_page = move |forward: bool| {
        let result = {
            let mut session = session.write();
            if forward {
                session.next_page()
            } else {
                session.prev_page()
            }
        };
        match result {
            Ok(Some(ticket)) => {
                if let Locator::Page(page) = ticket.request.locator {
                    navigator().replace(AppView::PageReaderView { page });
                }
                start_fetch(session, ticket);
            }
            Ok(None) => {}
            Err(err) => notice.set(Some(err.to_string())),
        }
    };

    let on_reciter_change = move |evt: FormEvent| {
        let ticket = session.write().change_reciter(&evt.value());
        if let Some(ticket) = ticket {
            start_fetch(session, ticket);
        }
    };

    let on_translation_change = move |evt: FormEvent| {
        let value = evt.value();
        let selected = Some(value.as_str()).filter(|value| !value.is_empty());
        let ticket = session.write().change_translation(selected);
        if let Some(ticket) = ticket {
            start_fetch(session, ticket);
        }
    };

    let on_save_progress = move |_| {
        let result = session.peek().save_progress();
        notice.set(Some(match result {
            Ok(()) => "Reading progress saved.".to_string(),
            Err(err) => err.to_string(),
        }));
    };

    let on_retry = move |_| {
        let result = begin_load(&mut session.write(), locator, false);
        match result {
            Ok(Some(ticket)) => start_fetch(session, ticket),
            Ok(None) => {}
            Err(err) => notice.set(Some(err.to_string())),
        }
    };

    let title = match (&state.surah, locator) {
        (Some(surah), Locator::Surah(_)) => surah.english_name.clone(),
        (_, Locator::Surah(number)) => format!("Surah {number}"),
        (_, Locator::Page(page)) => format!("Page {page}"),
    };
    let subtitle = state
        .surah
        .as_ref()
        .map(|surah| {
            format!(
                "{} · {} · {} verses",
                surah.english_name_translation, surah.revelation_type, surah.ayah_count
            )
        })
        .unwrap_or_default();
    let arabic_name = state.surah.as_ref().map(|surah| surah.name.clone());
    let page_mode = matches!(locator, Locator::Page(_));
    let selected_translation = state.translation.clone().unwrap_or_default();

    rsx! {
        AudioController { session }

        div { class: "space-y-6 pb-32",
            header { class: "page-header page-header--split",
                div {
                    h1 { class: "page-title", "{title}" }
                    p { class: "page-subtitle", "{subtitle}" }
                }
                if let Some(name) = arabic_name {
                    span { class: "text-2xl text-zinc-200", dir: "rtl", "{name}" }
                }
            }

            div { class: "grid grid-cols-1 md:grid-cols-2 gap-3",
                select {
                    class: "px-4 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                    onchange: on_reciter_change,
                    match &*reciters.read_unchecked() {
                        Some(Ok(list)) => rsx! {
                            for edition in list.iter() {
                                option {
                                    key: "{edition.identifier}",
                                    value: "{edition.identifier}",
                                    selected: edition.identifier == state.reciter,
                                    "{edition.english_name}"
                                }
                            }
                        },
                        _ => rsx! {
                            option { value: "{state.reciter}", selected: true, "{state.reciter}" }
                        },
                    }
                }
                select {
                    class: "px-4 py-2 rounded-xl bg-zinc-900 border border-zinc-800 text-white",
                    onchange: on_translation_change,
                    option { value: "", selected: selected_translation.is_empty(), "No translation" }
                    if let Some(Ok(list)) = &*translations.read_unchecked() {
                        for edition in list.iter() {
                            option {
                                key: "{edition.identifier}",
                                value: "{edition.identifier}",
                                selected: edition.identifier == selected_translation,
                                "{edition.english_name} ({edition.language})"
                            }
                        }
                    }
                }
            }

            if let Some(message) = notice() {
                div { class: "flex items-center justify-between px-4 py-2 rounded-xl bg-zinc-900 text-sm text-amber-300",
                    span { "{message}" }
                    button {
                        class: "text-zinc-400 hover:text-white",
                        aria_label: "Dismiss",
                        onclick: move |_| notice.set(None),
                        Icon { name: "x".to_string(), class: "w-4 h-4".to_string() }
                    }
                }
            }

            if busy {
                div { class: "flex items-center justify-center py-20",
                    Icon { name: "loader".to_string(), class: "w-8 h-8 text-zinc-500".to_string() }
                }
            } else if let Some(error) = state.error.clone() {
                div { class: "flex flex-col items-center justify-center py-20",
                    Icon { name: "book".to_string(), class: "w-16 h-16 text-zinc-600 mb-4".to_string() }
                    h2 { class: "text-xl font-semibold text-white mb-2", "Verses could not be loaded" }
                    p { class: "text-zinc-400 text-center max-w-md", "{error}" }
                    button {
                        class: "mt-6 px-6 py-3 bg-emerald-500 hover:bg-emerald-400 text-white font-medium rounded-xl transition-colors",
                        onclick: on_retry,
                        "Try again"
                    }
                }
            } else {
                ol { class: "space-y-3",
                    for (index, verse) in state.verses.iter().enumerate() {
                        VerseRow {
                            key: "{verse.number}",
                            index,
                            verse: verse.clone(),
                            current: cursor == Some(index),
                            bookmarked: bookmarks.contains(&verse.verse_id()),
                            on_play: move |index| play_index(index),
                            on_bookmark: move |id: VerseId| {
                                let result = session.write().toggle_bookmark(id);
                                if let Err(err) = result {
                                    notice.set(Some(err.to_string()));
                                }
                            },
                        }
                    }
                }
            }
        }

        // Fixed bottom transport
        div { class: "fixed bottom-0 inset-x-0 2xl:left-64 z-20 border-t border-zinc-800/60 bg-zinc-950/90 backdrop-blur-xl px-4 py-3",
            div { class: "flex flex-wrap items-center justify-between gap-3 max-w-5xl mx-auto",
                div { class: "flex items-center gap-2",
                    if page_mode {
                        button {
                            class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60",
                            aria_label: "Previous page",
                            disabled: busy,
                            onclick: move |_| step_page(false),
                            Icon { name: "arrow-left".to_string(), class: "w-5 h-5".to_string() }
                        }
                    }
                    button {
                        id: "prev-btn",
                        class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60",
                        aria_label: "Previous verse",
                        disabled: busy || cursor.map_or(true, |index| index == 0),
                        onclick: move |_| {
                            if let Some(index) = cursor.and_then(|index| index.checked_sub(1)) {
                                play_index(index);
                            }
                        },
                        Icon { name: "prev".to_string(), class: "w-5 h-5".to_string() }
                    }
                    button {
                        id: "play-pause-btn",
                        class: "p-3 rounded-full bg-emerald-500 hover:bg-emerald-400 text-white",
                        aria_label: if is_playing { "Pause" } else { "Play" },
                        disabled: busy || verse_count == 0,
                        onclick: on_toggle,
                        if is_playing {
                            Icon { name: "pause".to_string(), class: "w-5 h-5".to_string() }
                        } else {
                            Icon { name: "play".to_string(), class: "w-5 h-5".to_string() }
                        }
                    }
                    button {
                        id: "next-btn",
                        class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60",
                        aria_label: "Next verse",
                        disabled: busy || cursor.map_or(verse_count == 0, |index| index + 1 >= verse_count),
                        onclick: move |_| {
                            let next = cursor.map_or(0, |index| index + 1);
                            if next < verse_count {
                                play_index(next);
                            }
                        },
                        Icon { name: "next".to_string(), class: "w-5 h-5".to_string() }
                    }
                    if page_mode {
                        button {
                            class: "p-2 rounded-lg text-zinc-300 hover:text-white hover:bg-zinc-800/60 rotate-180",
                            aria_label: "Next page",
                            disabled: busy,
                            onclick: move |_| step_page(true),
                            Icon { name: "arrow-left".to_string(), class: "w-5 h-5".to_string() }
                        }
                    }
                }

                div { class: "flex items-center gap-3 text-sm text-zinc-400",
                    Icon { name: "repeat".to_string(), class: "w-4 h-4".to_string() }
                    select {
                        class: "px-2 py-1 rounded-lg bg-zinc-900 border border-zinc-800 text-white",
                        onchange: move |evt: FormEvent| {
                            session.write().set_repeat_mode(parse_repeat_mode(&evt.value()));
                        },
                        for mode in [RepeatMode::None, RepeatMode::Verse, RepeatMode::Set] {
                            option {
                                value: repeat_mode_value(mode),
                                selected: mode == state.repeat_mode,
                                "{repeat_mode_label(mode)}"
                            }
                        }
                    }
                    if state.repeat_mode == RepeatMode::Verse {
                        input {
                            class: "w-16 px-2 py-1 rounded-lg bg-zinc-900 border border-zinc-800 text-white",
                            r#type: "number",
                            min: "1",
                            max: "20",
                            value: "{state.verse_repeat_count}",
                            onchange: move |evt: FormEvent| {
                                if let Ok(count) = evt.value().trim().parse::<u32>() {
                                    session.write().set_verse_repeat_count(count);
                                }
                            },
                        }
                        span { "× ({state.repeat_counter + 1})" }
                    }
                    Icon { name: "volume".to_string(), class: "w-4 h-4".to_string() }
                    input {
                        class: "w-24",
                        r#type: "range",
                        min: "0",
                        max: "1",
                        step: "0.05",
                        value: "{state.volume}",
                        oninput: move |evt: FormEvent| {
                            if let Ok(volume) = evt.value().parse::<f64>() {
                                session.write().set_volume(volume);
                            }
                        },
                    }
                    button {
                        class: "px-3 py-1.5 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-zinc-200",
                        disabled: state.locator.is_none(),
                        onclick: on_save_progress,
                        "Save progress"
                    }
                }
            }
            if state.status == PlaybackStatus::Paused && state.current_verse().is_some() {
                p { class: "text-center text-xs text-zinc-500 mt-1", "Paused" }
            }
        }
    }
}

#[component]
fn VerseRow(
    index: usize,
    verse: Verse,
    current: bool,
    bookmarked: bool,
    on_play: EventHandler<usize>,
    on_bookmark: EventHandler<VerseId>,
) -> Element {
    let id = verse.verse_id();
    let row_class = if current {
        "rounded-2xl p-5 bg-emerald-500/10 ring-1 ring-emerald-500/40 cursor-pointer"
    } else {
        "rounded-2xl p-5 bg-zinc-900/60 hover:bg-zinc-800/60 cursor-pointer"
    };

    rsx! {
        li {
            id: "verse-{index}",
            class: "{row_class}",
            onclick: move |_| on_play.call(index),
            div { class: "flex items-start justify-between gap-4",
                span { class: "shrink-0 w-10 h-10 rounded-xl bg-zinc-800 text-zinc-300 flex items-center justify-center text-sm",
                    "{id}"
                }
                button {
                    class: "p-2 rounded-lg text-zinc-400 hover:text-emerald-400",
                    aria_label: if bookmarked { "Remove bookmark" } else { "Bookmark verse" },
                    onclick: move |evt: MouseEvent| {
                        evt.stop_propagation();
                        on_bookmark.call(id);
                    },
                    if bookmarked {
                        Icon { name: "bookmark-filled".to_string(), class: "w-5 h-5 text-emerald-400".to_string() }
                    } else {
                        Icon { name: "bookmark".to_string(), class: "w-5 h-5".to_string() }
                    }
                }
            }
            p { class: "mt-3 text-2xl leading-loose text-right text-white", dir: "rtl", "{verse.text}" }
            if let Some(translation) = verse.translation.as_ref() {
                p { class: "mt-3 text-zinc-400", "{translation}" }
            }
        }
    }
}
