//! Static page shells. Each page talks to the JSON API from the browser.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub async fn chat() -> Html<&'static str> {
    Html(include_str!("../../assets/chat.html"))
}

pub async fn faqs() -> Html<&'static str> {
    Html(include_str!("../../assets/faqs.html"))
}

pub async fn login() -> Html<&'static str> {
    Html(include_str!("../../assets/login.html"))
}

pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../assets/dashboard.html"))
}

pub async fn knowledge_base() -> Html<&'static str> {
    Html(include_str!("../../assets/knowledge_base.html"))
}

pub async fn chat_logs() -> Html<&'static str> {
    Html(include_str!("../../assets/chat_logs.html"))
}
