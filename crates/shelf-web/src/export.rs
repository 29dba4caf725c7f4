//! JSON and XML dumps of the product table.
//!
//! Both encodings follow the framework fixture layout: one `object` per
//! record carrying its `model` label, primary key and field values.

use std::io;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shelf_core::{Price, Product, ProductId, UserId};

use crate::error::ShelfError;
use crate::extract::IdPath;
use crate::state::AppState;

/// Model label written into every record.
pub const PRODUCT_MODEL: &str = "main.product";

#[derive(Serialize)]
struct DumpRecord<'a> {
    model: &'static str,
    pk: ProductId,
    fields: DumpFields<'a>,
}

#[derive(Serialize)]
struct DumpFields<'a> {
    name: &'a str,
    price: &'a Price,
    description: &'a str,
    user: UserId,
}

impl<'a> From<&'a Product> for DumpRecord<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            model: PRODUCT_MODEL,
            pk: product.id,
            fields: DumpFields {
                name: &product.name,
                price: &product.price,
                description: &product.description,
                user: product.owner,
            },
        }
    }
}

/// Single-line JSON with `", "` between items and `": "` after keys.
struct FixtureFormatter;

impl serde_json::ser::Formatter for FixtureFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub fn to_json(products: &[Product]) -> anyhow::Result<String> {
    let records: Vec<DumpRecord<'_>> = products.iter().map(DumpRecord::from).collect();
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, FixtureFormatter);
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

pub fn to_xml(products: &[Product]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<django-objects version="1.0">"#);

    for product in products {
        xml.push_str(&format!(
            r#"<object model="{}" pk="{}">"#,
            PRODUCT_MODEL, product.id
        ));
        xml.push_str(&format!(
            r#"<field name="name" type="CharField">{}</field>"#,
            escape_xml(&product.name)
        ));
        xml.push_str(&format!(
            r#"<field name="price" type="IntegerField">{}</field>"#,
            escape_xml(&product.price.to_string())
        ));
        xml.push_str(&format!(
            r#"<field name="description" type="TextField">{}</field>"#,
            escape_xml(&product.description)
        ));
        xml.push_str(&format!(
            r#"<field name="user" rel="ManyToOneRel" to="auth.user">{}</field>"#,
            product.owner
        ));
        xml.push_str("</object>");
    }

    xml.push_str("</django-objects>");
    xml
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn json_response(products: &[Product]) -> Result<Response, ShelfError> {
    let body = to_json(products)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

fn xml_response(products: &[Product]) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], to_xml(products)).into_response()
}

/// All products as JSON.
pub async fn show_json(State(state): State<AppState>) -> Result<Response, ShelfError> {
    let products = state.db().all_products().await?;
    json_response(&products)
}

/// All products as XML.
pub async fn show_xml(State(state): State<AppState>) -> Result<Response, ShelfError> {
    let products = state.db().all_products().await?;
    Ok(xml_response(&products))
}

/// The product with `id` as a JSON list, empty if there is none.
pub async fn show_json_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response, ShelfError> {
    let products = state.db().products_by_id(id).await?;
    json_response(&products)
}

/// The product with `id` as XML, empty if there is none.
pub async fn show_xml_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Response, ShelfError> {
    let products = state.db().products_by_id(id).await?;
    Ok(xml_response(&products))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        vec![
            Product {
                id: ProductId(1),
                name: "Pen".to_string(),
                price: Price::Amount(10),
                description: "Blue".to_string(),
                owner: UserId(1),
            },
            Product {
                id: ProductId(2),
                name: "Tea & <Biscuits>".to_string(),
                price: Price::Raw("cheap".to_string()),
                description: String::new(),
                owner: UserId(2),
            },
        ]
    }

    #[test]
    fn json_uses_fixture_layout() {
        let json: serde_json::Value = serde_json::from_str(&to_json(&products()).unwrap()).unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({
                "model": "main.product",
                "pk": 1,
                "fields": {"name": "Pen", "price": 10, "description": "Blue", "user": 1}
            })
        );
        assert_eq!(json[1]["fields"]["price"], "cheap");
    }

    #[test]
    fn json_separators_are_spaced() {
        assert_eq!(
            to_json(&products()[..1]).unwrap(),
            r#"[{"model": "main.product", "pk": 1, "fields": {"name": "Pen", "price": 10, "description": "Blue", "user": 1}}]"#
        );
        let both = to_json(&products()).unwrap();
        assert!(both.contains(r#""user": 1}}, {"model": "main.product", "pk": 2"#));
        assert!(both.contains(r#""price": "cheap""#));
    }

    #[test]
    fn xml_matches_fixture_layout() {
        let xml = to_xml(&products()[..1]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <django-objects version=\"1.0\"><object model=\"main.product\" pk=\"1\">\
             <field name=\"name\" type=\"CharField\">Pen</field>\
             <field name=\"price\" type=\"IntegerField\">10</field>\
             <field name=\"description\" type=\"TextField\">Blue</field>\
             <field name=\"user\" rel=\"ManyToOneRel\" to=\"auth.user\">1</field>\
             </object></django-objects>"
        );
    }

    #[test]
    fn xml_escapes_text() {
        let xml = to_xml(&products());
        assert!(xml.contains("Tea &amp; &lt;Biscuits&gt;"));
        assert!(xml.contains(r#"type="IntegerField">cheap</field>"#));
    }

    #[test]
    fn empty_collections() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
        assert!(to_xml(&[]).ends_with(r#"<django-objects version="1.0"></django-objects>"#));
    }
}
