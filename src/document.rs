//! The contract consumed from the document-understanding collaborator (§3).
//!
//! The wire format is duck-typed JSON (any entity is "an object with these fields"); we parse
//! it once at the boundary into a tagged sum type and the rest of the core matches on the tag
//! rather than inspecting string fields (Design Notes §9).

use serde::Deserialize;

/// Raw wire shape of one entity as returned by the document-AI collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub type_: String,
    pub mention_text: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub properties: Vec<RawEntity>,
    #[serde(default)]
    pub page_anchor: Option<RawPageAnchor>,
    #[serde(default)]
    pub text_anchor: Option<RawTextAnchor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPageAnchor {
    #[serde(default)]
    pub page_refs: Vec<RawPageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPageRef {
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTextAnchor {
    #[serde(default)]
    pub text_segments: Vec<RawTextSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTextSegment {
    #[serde(default)]
    pub start_index: usize,
    #[serde(default)]
    pub end_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub page_number: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub header_rows: Vec<TableRow>,
    #[serde(default)]
    pub body_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub text: String,
}

/// Raw document shape as received from the document-AI collaborator over the wire.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStructuredDocument {
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A 0-based page ref plus a character span into `StructuredDocument::text`, carried alongside
/// every entity we keep around after tagging.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntitySpan {
    pub page: Option<u32>,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
}

impl EntitySpan {
    fn from_raw(raw: &RawEntity) -> Self {
        let page = raw
            .page_anchor
            .as_ref()
            .and_then(|a| a.page_refs.first())
            .map(|r| r.page);
        let (start_index, end_index) = raw
            .text_anchor
            .as_ref()
            .and_then(|a| a.text_segments.first())
            .map(|s| (Some(s.start_index), Some(s.end_index)))
            .unwrap_or((None, None));
        Self {
            page,
            start_index,
            end_index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimpleEntity {
    pub mention_text: String,
    pub confidence: f32,
    pub span: EntitySpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemPropertyKind {
    ProductCode,
    Description,
    UnitPrice,
    Quantity,
    Other,
}

#[derive(Debug, Clone)]
pub struct LineItemProperty {
    pub kind: LineItemPropertyKind,
    pub mention_text: String,
}

#[derive(Debug, Clone)]
pub struct LineItemEntity {
    pub mention_text: String,
    pub confidence: f32,
    pub span: EntitySpan,
    pub properties: Vec<LineItemProperty>,
}

impl LineItemEntity {
    pub fn property(&self, kind: LineItemPropertyKind) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.mention_text.as_str())
    }
}

/// The tagged entity sum type the rest of the core matches on (Design Notes §9), replacing the
/// wire-level `RawEntity` "any object with these fields" shape.
#[derive(Debug, Clone)]
pub enum Entity {
    LineItem(LineItemEntity),
    InvoiceDate(SimpleEntity),
    InvoiceId(SimpleEntity),
    SupplierName(SimpleEntity),
    Other(SimpleEntity),
}

impl Entity {
    fn from_raw(raw: &RawEntity) -> Self {
        let span = EntitySpan::from_raw(raw);
        match raw.type_.as_str() {
            "line_item" => Entity::LineItem(LineItemEntity {
                mention_text: raw.mention_text.clone(),
                confidence: raw.confidence,
                span,
                properties: raw
                    .properties
                    .iter()
                    .map(|p| LineItemProperty {
                        kind: property_kind(&p.type_),
                        mention_text: p.mention_text.clone(),
                    })
                    .collect(),
            }),
            "invoice_date" => Entity::InvoiceDate(SimpleEntity {
                mention_text: raw.mention_text.clone(),
                confidence: raw.confidence,
                span,
            }),
            "invoice_id" => Entity::InvoiceId(SimpleEntity {
                mention_text: raw.mention_text.clone(),
                confidence: raw.confidence,
                span,
            }),
            "supplier_name" => Entity::SupplierName(SimpleEntity {
                mention_text: raw.mention_text.clone(),
                confidence: raw.confidence,
                span,
            }),
            _ => Entity::Other(SimpleEntity {
                mention_text: raw.mention_text.clone(),
                confidence: raw.confidence,
                span,
            }),
        }
    }
}

fn property_kind(type_: &str) -> LineItemPropertyKind {
    match type_ {
        "line_item/product_code" => LineItemPropertyKind::ProductCode,
        "line_item/description" => LineItemPropertyKind::Description,
        "line_item/unit_price" => LineItemPropertyKind::UnitPrice,
        "line_item/quantity" => LineItemPropertyKind::Quantity,
        _ => LineItemPropertyKind::Other,
    }
}

/// The owned, request-local document every extractor borrows immutably (Design Notes §9). No
/// extractor mutates this; the Creative-Coop product mapping is a separate owned structure built
/// alongside it.
#[derive(Debug, Clone, Default)]
pub struct StructuredDocument {
    pub text: Option<String>,
    pub entities: Vec<Entity>,
    pub pages: Vec<Page>,
    pub tables: Vec<Table>,
}

impl StructuredDocument {
    pub fn from_raw(raw: RawStructuredDocument) -> Self {
        Self {
            text: raw.text,
            entities: raw.entities.iter().map(Entity::from_raw).collect(),
            pages: raw.pages,
            tables: raw.tables,
        }
    }

    /// Flattened text, or empty string when the document is corrupted (§7 `InputShapeError`,
    /// §8 S5): callers that can proceed without text do so; callers that require it surface the
    /// shape error themselves.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn line_items(&self) -> impl Iterator<Item = &LineItemEntity> {
        self.entities.iter().filter_map(|e| match e {
            Entity::LineItem(li) => Some(li),
            _ => None,
        })
    }

    pub fn invoice_date_entity(&self) -> Option<&SimpleEntity> {
        self.entities.iter().find_map(|e| match e {
            Entity::InvoiceDate(s) => Some(s),
            _ => None,
        })
    }

    pub fn invoice_id_entity(&self) -> Option<&SimpleEntity> {
        self.entities.iter().find_map(|e| match e {
            Entity::InvoiceId(s) => Some(s),
            _ => None,
        })
    }

    pub fn supplier_name_entity(&self) -> Option<&SimpleEntity> {
        self.entities.iter().find_map(|e| match e {
            Entity::SupplierName(s) => Some(s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_document_has_no_text_but_does_not_panic() {
        let raw = RawStructuredDocument {
            text: None,
            ..Default::default()
        };
        let doc = StructuredDocument::from_raw(raw);
        assert_eq!(doc.text_or_empty(), "");
        assert!(doc.line_items().next().is_none());
    }

    #[test]
    fn line_item_properties_tag_correctly() {
        let raw = RawEntity {
            type_: "line_item".to_string(),
            mention_text: "XS9826A widget $1.60".to_string(),
            confidence: 0.9,
            properties: vec![RawEntity {
                type_: "line_item/product_code".to_string(),
                mention_text: "XS9826A".to_string(),
                confidence: 0.9,
                properties: vec![],
                page_anchor: None,
                text_anchor: None,
            }],
            page_anchor: None,
            text_anchor: None,
        };
        let entity = Entity::from_raw(&raw);
        match entity {
            Entity::LineItem(li) => {
                assert_eq!(
                    li.property(LineItemPropertyKind::ProductCode),
                    Some("XS9826A")
                );
            }
            _ => panic!("expected line item"),
        }
    }
}
