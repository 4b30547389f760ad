use maud::{html, Markup, DOCTYPE};

const NAV: [(&str, &str); 4] = [
    ("/", "Overview"),
    ("/api/bids", "Bids (JSON)"),
    ("/api/jobs", "Jobs (JSON)"),
    ("/api/units", "Inventory (JSON)"),
];

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Renovation Tracker" }
                link rel="stylesheet" href="/static/main.css";
            }
            body {
                header class="topbar" {
                    a class="brand" href="/" { "Renovation Tracker" }
                    nav {
                        ul {
                            @for (href, label) in NAV {
                                li { a href=(href) { (label) } }
                            }
                        }
                    }
                }
                main class="container" {
                    (content)
                }
            }
        }
    }
}
