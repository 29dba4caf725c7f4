//! Page templates for the product views and the account forms.

use crate::templates::{
    card, csrf_input, empty_state, html_escape, input, layout, messages, submit_button, table,
    textarea,
};
use shelf_core::config::SiteConfig;
use shelf_core::{FormErrors, LoginForm, Product, ProductForm, RegistrationForm};

// =============================================================================
// Product listing
// =============================================================================

pub fn main_page(site: &SiteConfig, username: &str, products: &[Product], last_login: &str) -> String {
    let header = format!(
        r##"<div class="mb-8">
            <h1 class="text-3xl font-bold text-gray-900">{title}</h1>
            <dl class="mt-4 grid grid-cols-2 gap-2 text-gray-700">
                <dt class="font-medium">Name:</dt><dd id="username">{username}</dd>
                <dt class="font-medium">Class:</dt><dd id="class-label">{class_label}</dd>
            </dl>
        </div>"##,
        title = html_escape(&site.title),
        username = html_escape(username),
        class_label = html_escape(&site.class_label),
    );

    let listing = if products.is_empty() {
        empty_state(
            "No products yet",
            "Products you add will show up here.",
            Some(("Add New Product", "/create-product")),
        )
    } else {
        let rows: Vec<Vec<String>> = products.iter().map(product_row).collect();
        format!(
            r##"{table}
            <p class="mt-4 text-sm text-gray-600">You have {count} product(s) in this application.</p>
            <a href="/create-product" class="mt-4 inline-block bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg">Add New Product</a>"##,
            table = table(&["Name", "Price", "Description", ""], &rows),
            count = products.len(),
        )
    };

    let ajax_form = card(
        "Quick Add (AJAX)",
        r##"<form id="ajax-product-form" class="grid grid-cols-1 md:grid-cols-4 gap-3">
                <input name="name" placeholder="Name" class="px-3 py-2 border border-gray-300 rounded-lg">
                <input name="price" placeholder="Price" class="px-3 py-2 border border-gray-300 rounded-lg">
                <input name="description" placeholder="Description" class="px-3 py-2 border border-gray-300 rounded-lg">
                <button type="submit" class="bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg">Add</button>
            </form>"##,
    );

    let content = format!(
        r##"{header}
        {products_card}
        <div class="mt-6">{ajax_form}</div>
        <p class="mt-6 text-sm text-gray-500">Last login session: <span id="last-login">{last_login}</span></p>"##,
        products_card = card("Products", &listing),
        last_login = html_escape(last_login),
    );

    layout("Products", &site.title, Some(username), &content)
}

fn product_row(product: &Product) -> Vec<String> {
    vec![
        html_escape(&product.name),
        html_escape(&product.price.to_string()),
        html_escape(&product.description),
        format!(
            r##"<a href="/edit-product/{id}" class="text-indigo-600 hover:underline">Edit</a>
                <a href="/delete-product/{id}" class="ml-3 text-red-600 hover:underline">Delete</a>"##,
            id = product.id,
        ),
    ]
}

// =============================================================================
// Product create / edit
// =============================================================================

/// Which product form is being rendered.
#[derive(Debug, Clone, Copy)]
pub enum ProductFormMode {
    Create,
    Edit(shelf_core::ProductId),
}

impl ProductFormMode {
    fn title(&self) -> &'static str {
        match self {
            ProductFormMode::Create => "Add New Product",
            ProductFormMode::Edit(_) => "Edit Product",
        }
    }

    fn action(&self) -> String {
        match self {
            ProductFormMode::Create => "/create-product".to_string(),
            ProductFormMode::Edit(id) => format!("/edit-product/{}", id),
        }
    }
}

pub fn product_form_page(
    site: &SiteConfig,
    username: &str,
    mode: ProductFormMode,
    form: &ProductForm,
    errors: &FormErrors,
    csrf_token: &str,
) -> String {
    let body = format!(
        r##"<form method="POST" action="{action}" class="space-y-5">
            {csrf}
            {name}
            {price}
            {description}
            {submit}
        </form>"##,
        action = mode.action(),
        csrf = csrf_input(csrf_token),
        name = input("name", "Name", "text", &form.name, errors.field("name")),
        price = input("price", "Price", "number", &form.price, errors.field("price")),
        description = textarea("description", "Description", &form.description, errors.field("description")),
        submit = submit_button(mode.title()),
    );

    let content = format!(
        r##"<div class="max-w-lg mx-auto">{card}</div>"##,
        card = card(mode.title(), &body),
    );
    layout(mode.title(), &site.title, Some(username), &content)
}

// =============================================================================
// Accounts
// =============================================================================

pub fn register_page(
    site: &SiteConfig,
    form: &RegistrationForm,
    errors: &FormErrors,
    csrf_token: &str,
) -> String {
    let body = format!(
        r##"<form method="POST" action="/register" class="space-y-5">
            {csrf}
            {username}
            {password1}
            {password2}
            {submit}
        </form>
        <p class="mt-4 text-sm text-gray-600">Already have an account? <a href="/login" class="text-indigo-600">Login</a></p>"##,
        csrf = csrf_input(csrf_token),
        username = input("username", "Username", "text", &form.username, errors.field("username")),
        password1 = input("password1", "Password", "password", "", errors.field("password1")),
        password2 = input("password2", "Password confirmation", "password", "", errors.field("password2")),
        submit = submit_button("Register"),
    );

    let content = format!(r##"<div class="max-w-md mx-auto">{}</div>"##, card("Register", &body));
    layout("Register", &site.title, None, &content)
}

pub fn login_page(
    site: &SiteConfig,
    form: &LoginForm,
    notices: &[(&str, &str)],
    csrf_token: &str,
) -> String {
    let next_input = form
        .next
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, html_escape(n)))
        .unwrap_or_default();

    let body = format!(
        r##"{messages}
        <form method="POST" action="/login" class="space-y-5">
            {csrf}
            {next_input}
            {username}
            {password}
            {submit}
        </form>
        <p class="mt-4 text-sm text-gray-600">Don't have an account yet? <a href="/register" class="text-indigo-600">Register Now</a></p>"##,
        messages = messages(notices),
        csrf = csrf_input(csrf_token),
        username = input("username", "Username", "text", &form.username, &[]),
        password = input("password", "Password", "password", "", &[]),
        submit = submit_button("Login"),
    );

    let content = format!(r##"<div class="max-w-md mx-auto">{}</div>"##, card("Login", &body));
    layout("Login", &site.title, None, &content)
}
