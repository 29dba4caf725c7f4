//! HTML building blocks shared by the pages.
//!
//! Uses a simple template approach with Tailwind CSS. Every value that comes
//! from a user or the database goes through [`html_escape`].

use crate::csrf::CSRF_FIELD;

/// Base HTML layout wrapper.
pub fn layout(title: &str, site_title: &str, username: Option<&str>, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site_title}</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body class="bg-gray-50 min-h-screen">
    {NAV}

    <main class="p-6 lg:p-8">
        <div class="max-w-5xl mx-auto">
            {content}
        </div>
    </main>

    {TOAST}
    <script src="/static/shelf.js"></script>
</body>
</html>"##,
        title = html_escape(title),
        site_title = html_escape(site_title),
        NAV = nav_template(site_title, username),
        TOAST = toast_template(),
    )
}

fn nav_template(site_title: &str, username: Option<&str>) -> String {
    let right = match username {
        Some(username) => format!(
            r##"<span class="text-sm">{username}</span>
                <a href="/logout" class="px-3 py-1 bg-indigo-700 hover:bg-indigo-800 rounded-lg text-sm">Logout</a>"##,
            username = html_escape(username),
        ),
        None => r##"<a href="/login" class="px-3 py-1 hover:bg-indigo-700 rounded-lg text-sm">Login</a>
                <a href="/register" class="px-3 py-1 hover:bg-indigo-700 rounded-lg text-sm">Register</a>"##
            .to_string(),
    };

    format!(
        r##"<nav class="bg-indigo-600 text-white px-4 py-3 shadow-lg">
        <div class="max-w-5xl mx-auto flex items-center justify-between">
            <a href="/" class="text-lg font-semibold">{site_title}</a>
            <div class="flex items-center gap-4">
                {right}
            </div>
        </div>
    </nav>"##,
        site_title = html_escape(site_title),
    )
}

fn toast_template() -> &'static str {
    r##"<div id="toast" class="hidden fixed bottom-4 right-4 bg-green-500 text-white px-6 py-3 rounded-lg shadow-lg z-50">
        <span id="toast-message"></span>
    </div>"##
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r##"<div class="bg-white rounded-xl shadow-sm border border-gray-200 overflow-hidden">
            <div class="px-6 py-4 border-b border-gray-200">
                <h3 class="text-lg font-semibold text-gray-900">{title}</h3>
            </div>
            <div class="p-6">
                {content}
            </div>
        </div>"##,
        title = html_escape(title),
    )
}

/// Hidden CSRF field for a form.
pub fn csrf_input(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{CSRF_FIELD}" value="{}">"#,
        html_escape(token)
    )
}

/// Labelled input with its validation errors.
pub fn input(name: &str, label: &str, input_type: &str, value: &str, errors: &[String]) -> String {
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <input type="{input_type}" name="{name}" id="{name}" value="{value}"
                   class="w-full px-4 py-2 border {border} rounded-lg bg-white text-gray-900 focus:ring-2 focus:ring-indigo-500">
            {errors}
        </div>"##,
        value = html_escape(value),
        border = border_class(errors),
        errors = field_errors(errors),
    )
}

/// Labelled textarea with its validation errors.
pub fn textarea(name: &str, label: &str, value: &str, errors: &[String]) -> String {
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <textarea name="{name}" id="{name}" rows="4"
                      class="w-full px-4 py-2 border {border} rounded-lg bg-white text-gray-900 focus:ring-2 focus:ring-indigo-500">{value}</textarea>
            {errors}
        </div>"##,
        value = html_escape(value),
        border = border_class(errors),
        errors = field_errors(errors),
    )
}

fn border_class(errors: &[String]) -> &'static str {
    if errors.is_empty() { "border-gray-300" } else { "border-red-500" }
}

/// `<ul class="errorlist">` for one field, empty when there are no errors.
pub fn field_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!(r#"<li>{}</li>"#, html_escape(e)))
        .collect();
    format!(r#"<ul class="errorlist text-sm text-red-600">{items}</ul>"#)
}

/// Flash-style message list.
pub fn messages(messages: &[(&str, &str)]) -> String {
    messages
        .iter()
        .map(|(level, text)| {
            let color = match *level {
                "success" => "green",
                "error" => "red",
                _ => "blue",
            };
            format!(
                r##"<div class="message {level} mb-4 p-4 bg-{color}-50 border border-{color}-200 rounded-lg text-{color}-700">{text}</div>"##,
                text = html_escape(text),
            )
        })
        .collect()
}

/// Submit button.
pub fn submit_button(text: &str) -> String {
    format!(
        r##"<button type="submit" class="w-full py-2 px-4 bg-indigo-600 hover:bg-indigo-700 text-white font-medium rounded-lg">{text}</button>"##
    )
}

/// Table component. Cells are inserted as-is; escape them before calling.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers_html: String = headers
        .iter()
        .map(|h| format!(r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">{h}</th>"#))
        .collect();

    let rows_html: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!(r#"<td class="px-6 py-4 text-sm text-gray-900">{cell}</td>"#))
                .collect();
            format!(r#"<tr class="hover:bg-gray-50">{cells}</tr>"#)
        })
        .collect();

    format!(
        r##"<div class="overflow-x-auto">
            <table class="min-w-full divide-y divide-gray-200">
                <thead class="bg-gray-50">
                    <tr>{headers_html}</tr>
                </thead>
                <tbody class="bg-white divide-y divide-gray-200">
                    {rows_html}
                </tbody>
            </table>
        </div>"##
    )
}

/// Empty state component.
pub fn empty_state(title: &str, description: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action.map_or(String::new(), |(text, href)| {
        format!(r##"<a href="{href}" class="mt-4 inline-flex items-center gap-2 bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg font-medium">{text}</a>"##)
    });

    format!(
        r##"<div class="text-center py-12">
            <h3 class="text-lg font-medium text-gray-900">{title}</h3>
            <p class="mt-1 text-gray-500">{description}</p>
            {action_html}
        </div>"##
    )
}

/// Simple HTML escape function
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b class="x">Tom & 'Jerry'</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn input_renders_errors_and_escaped_value() {
        let html = input("name", "Name", "text", "<pen>", &["This field is required.".to_string()]);
        assert!(html.contains(r#"value="&lt;pen&gt;""#));
        assert!(html.contains("<li>This field is required.</li>"));
        assert!(html.contains("border-red-500"));
    }

    #[test]
    fn no_errors_renders_nothing() {
        assert_eq!(field_errors(&[]), "");
    }
}
