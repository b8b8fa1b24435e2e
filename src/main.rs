use dioxus::prelude::*;

mod api;
mod components;
mod config;
mod db;
mod diagnostics;
mod reader;

use components::AppView;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    diagnostics::init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Ramadan Companion");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#0f766e" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-status-bar-style", content: "default" }
        document::Meta { name: "apple-mobile-web-app-title", content: "Ramadan Companion" }

        document::Script { src: "https://cdn.tailwindcss.com" }
        document::Stylesheet { href: APP_CSS }

        Router::<AppView> {}
    }
}
