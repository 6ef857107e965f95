use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

pub enum SampleTarget {
    Page(usize),
    NamedDestination(&'static str),
    NamedAction(&'static str),
}

pub struct SampleLink {
    pub page: usize,
    pub line: usize,
    pub target: SampleTarget,
}

pub fn line_y(line: usize) -> f64 {
    720.0 - 20.0 * line as f64
}

pub fn link_rect(line: usize) -> [f64; 4] {
    let y = line_y(line);
    [70.0, y - 4.0, 540.0, y + 14.0]
}

fn real_array(values: [f64; 4]) -> Object {
    Object::Array(values.iter().map(|value| Object::Real(*value as f32)).collect())
}

pub fn build_pdf(
    pages: &[Vec<&str>],
    links: &[SampleLink],
    named_destinations: &[(&str, usize)],
) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_ids = pages
        .iter()
        .map(|_| doc.new_object_id())
        .collect::<Vec<ObjectId>>();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    for (index, lines) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        for (line, text) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(72), Object::Real(line_y(line) as f32)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content should encode"),
        ));

        let annots = links
            .iter()
            .filter(|link| link.page == index)
            .map(|link| {
                let mut annot = dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => real_array(link_rect(link.line)),
                };
                match link.target {
                    SampleTarget::Page(page) => annot.set(
                        "Dest",
                        Object::Array(vec![
                            Object::Reference(page_ids[page - 1]),
                            Object::Name(b"Fit".to_vec()),
                        ]),
                    ),
                    SampleTarget::NamedDestination(name) => annot.set(
                        "A",
                        dictionary! {
                            "S" => "GoTo",
                            "D" => Object::String(name.as_bytes().to_vec(), StringFormat::Literal),
                        },
                    ),
                    SampleTarget::NamedAction(action) => annot.set(
                        "A",
                        dictionary! {
                            "S" => "Named",
                            "N" => Object::Name(action.as_bytes().to_vec()),
                        },
                    ),
                }
                Object::Reference(doc.add_object(annot))
            })
            .collect::<Vec<Object>>();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page.set("Annots", Object::Array(annots));
        }
        doc.objects.insert(page_ids[index], Object::Dictionary(page));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => Object::Integer(pages.len() as i64),
            "Resources" => resources_id,
            "MediaBox" => real_array([0.0, 0.0, 612.0, 792.0]),
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !named_destinations.is_empty() {
        let mut names = Vec::new();
        for (name, page) in named_destinations {
            names.push(Object::String(name.as_bytes().to_vec(), StringFormat::Literal));
            names.push(Object::Array(vec![
                Object::Reference(page_ids[page - 1]),
                Object::Name(b"Fit".to_vec()),
            ]));
        }
        let leaf_id = doc.add_object(dictionary! { "Names" => names });
        catalog.set(
            "Names",
            dictionary! {
                "Dests" => dictionary! { "Kids" => vec![Object::Reference(leaf_id)] },
            },
        );
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("sample PDF should serialize");
    buffer
}

// Fifteen pages; page 2 lists SECTION I (3), Overview (4), Risks (7) and
// SECTION II (10), each line linked to its page.
pub fn listing_pdf() -> Vec<u8> {
    let bodies = (3..=15)
        .map(|number| format!("Body page {number}"))
        .collect::<Vec<String>>();
    let mut pages = vec![
        vec!["Cover"],
        vec![
            "TABLE OF CONTENTS",
            "SECTION I ........ 3",
            "Overview ........ 4",
            "Risks ........ 7",
            "SECTION II ........ 10",
        ],
    ];
    pages.extend(bodies.iter().map(|text| vec![text.as_str()]));

    let links = [3, 4, 7, 10]
        .iter()
        .enumerate()
        .map(|(index, page)| SampleLink {
            page: 1,
            line: index + 1,
            target: SampleTarget::Page(*page),
        })
        .collect::<Vec<SampleLink>>();
    build_pdf(&pages, &links, &[])
}
