//! Single-page PDF sanction letter

use super::LetterError;
use crate::dialogue::SanctionTerms;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 50;

/// One line of the template: font resource, size, distance from page top
struct Line {
    font: &'static str,
    size: i64,
    from_top: i64,
    text: String,
}

fn template(terms: &SanctionTerms) -> Vec<Line> {
    vec![
        Line {
            font: "Bold",
            size: 30,
            from_top: 100,
            text: "Personal Loan Sanction Letter".to_string(),
        },
        Line {
            font: "Regular",
            size: 18,
            from_top: 150,
            text: format!("Dear {},", terms.subject_name),
        },
        Line {
            font: "Regular",
            size: 14,
            from_top: 200,
            text: "We are pleased to inform you that your personal loan has been sanctioned."
                .to_string(),
        },
        Line {
            font: "Bold",
            size: 16,
            from_top: 230,
            text: format!("Sanctioned Amount: Rs. {}", terms.amount_display()),
        },
        Line {
            font: "Regular",
            size: 14,
            from_top: 260,
            text: format!("Interest Rate: {}% p.a.", terms.rate_display()),
        },
    ]
}

fn name(s: &str) -> Object {
    Object::Name(s.as_bytes().to_vec())
}

/// Render the letter to PDF bytes
pub fn render_letter(terms: &SanctionTerms) -> Result<Vec<u8>, LetterError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "Bold" => bold_id,
            "Regular" => regular_id,
        },
    });

    let mut operations = Vec::new();
    for line in template(terms) {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![name(line.font), Object::Integer(line.size)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![
                Object::Integer(LEFT_MARGIN),
                Object::Integer(PAGE_HEIGHT - line.from_top),
            ],
        ));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.text)]));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| LetterError::Render(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::from(page_id)],
        "Count" => Object::Integer(1),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| LetterError::Render(e.to_string()))?;
    Ok(bytes)
}
