//! Defines the application routes.

use crate::components::views::*;
use crate::components::AppShell;
use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum AppView {
    #[layout(AppShell)]
        #[route("/")]
        HomeView {},
        #[route("/prayer-times")]
        PrayerTimesView {},
        #[route("/surahs")]
        SurahIndexView {},
        #[route("/surah/:surah")]
        SurahReaderView { surah: u16 },
        #[route("/page/:page")]
        PageReaderView { page: u16 },
        #[route("/ramadan")]
        RamadanCalendarView {},
}

pub fn view_label(view: &AppView) -> &'static str {
    match view {
        AppView::HomeView {} => "Home",
        AppView::PrayerTimesView {} => "Prayer Times",
        AppView::SurahIndexView {} => "Surahs",
        AppView::SurahReaderView { .. } => "Surah",
        AppView::PageReaderView { .. } => "Page",
        AppView::RamadanCalendarView {} => "Ramadan",
    }
}
