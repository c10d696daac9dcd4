use crate::error::AssemblyError;
use crate::pdf::font::TocFont;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

// US letter, in points.
pub const PAGE_WIDTH: i32 = 612;
pub const PAGE_HEIGHT: i32 = 792;

pub const TOC_TITLE: &str = "Оглавление";
const TITLE_X: i32 = 250;
const TITLE_Y: i32 = 750;
const TITLE_SIZE: i32 = 16;

const ENTRY_X: i32 = 50;
const ENTRY_SIZE: i32 = 10;
const FIRST_ENTRY_Y: i32 = 720;
const CONTINUATION_Y: i32 = 750;
pub const LINE_HEIGHT: i32 = 12;
pub const BOTTOM_MARGIN: i32 = 50;

const FONT_RESOURCE: &str = "F1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedText {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocPageLayout {
    pub items: Vec<PlacedText>,
}

/// Lay out TOC text (one entry per `\n`-separated line) over as many pages
/// as needed. Only the first page carries the title.
pub fn layout_toc(toc_text: &str) -> Vec<TocPageLayout> {
    let mut pages = Vec::new();
    let mut current = TocPageLayout {
        items: vec![PlacedText {
            text: TOC_TITLE.to_string(),
            x: TITLE_X,
            y: TITLE_Y,
            size: TITLE_SIZE,
        }],
    };
    let mut y = FIRST_ENTRY_Y;

    for line in toc_text.split('\n') {
        // page breaks are taken lazily so the last page is never empty
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut current));
            y = CONTINUATION_Y;
        }

        current.items.push(PlacedText {
            text: line.to_string(),
            x: ENTRY_X,
            y,
            size: ENTRY_SIZE,
        });
        y -= LINE_HEIGHT;
    }

    pages.push(current);
    pages
}

/// Rendered TOC pages as a standalone document, ready to be merged.
pub struct TocPages {
    pub doc: Document,
    pub page_count: usize,
}

/// Draw the laid-out pages with `font`, embedding it once for all pages.
pub fn render_toc_pages(
    layouts: &[TocPageLayout],
    font: &TocFont,
) -> Result<TocPages, AssemblyError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut encoder = font.encoder()?;

    let mut contents = Vec::with_capacity(layouts.len());
    for layout in layouts {
        let mut operations = Vec::new();
        for item in &layout.items {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), item.size.into()],
            ));
            operations.push(Operation::new("Td", vec![item.x.into(), item.y.into()]));
            operations.push(Operation::new("Tj", vec![encoder.encode_operand(&item.text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        contents.push(Content { operations }.encode()?);
    }

    let font_id = encoder.embed(&mut doc)?;
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];
    let mut kids = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        // Boxes and rotation are set explicitly so nothing is inherited once
        // these pages are moved under another document's page tree.
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "CropBox" => media_box.clone(),
            "Rotate" => 0,
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    debug!(font = font.postscript_name(), page_count, "rendered TOC pages");
    Ok(TocPages { doc, page_count })
}

/// Lay out and render in one step.
pub fn render_toc(toc_text: &str, font: &TocFont) -> Result<TocPages, AssemblyError> {
    render_toc_pages(&layout_toc(toc_text), font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::font::tests::system_font;

    fn lines(n: usize) -> String {
        (1..=n)
            .map(|i| format!("ГЛАВА {}........ {}", i, i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_single_page_with_title() {
        let pages = layout_toc("ГЛАВА ПЕРВАЯ..... 1\nГЛАВА ВТОРАЯ..... 3");
        assert_eq!(pages.len(), 1);

        let items = &pages[0].items;
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            PlacedText {
                text: TOC_TITLE.to_string(),
                x: 250,
                y: 750,
                size: 16,
            }
        );
        assert_eq!((items[1].x, items[1].y, items[1].size), (50, 720, 10));
        assert_eq!(items[2].y, 708);
    }

    #[test]
    fn test_first_page_capacity() {
        // 720 down to 60 in steps of 12
        assert_eq!(layout_toc(&lines(56)).len(), 1);
        assert_eq!(layout_toc(&lines(57)).len(), 2);
    }

    #[test]
    fn test_continuation_pages_have_no_title() {
        let pages = layout_toc(&lines(130));
        assert_eq!(pages.len(), 3);

        let titles = pages
            .iter()
            .flat_map(|p| &p.items)
            .filter(|item| item.text == TOC_TITLE)
            .count();
        assert_eq!(titles, 1);

        assert_eq!(pages[1].items[0].y, 750);
        assert_eq!(pages[1].items[0].size, 10);
        // 750 down to 54 in steps of 12
        assert_eq!(pages[1].items.len(), 59);
        assert_eq!(pages[0].items.len() - 1 + 59 + pages[2].items.len(), 130);
        assert!(pages
            .iter()
            .flat_map(|p| &p.items)
            .all(|item| item.y >= BOTTOM_MARGIN));
    }

    #[test]
    fn test_entry_order_preserved() {
        let pages = layout_toc(&lines(70));
        let texts: Vec<_> = pages
            .iter()
            .flat_map(|p| &p.items)
            .skip(1)
            .map(|item| item.text.clone())
            .collect();
        assert_eq!(texts, lines(70).split('\n').map(String::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_render_page_count_and_font() {
        let Some(font) = system_font() else { return };
        let toc = render_toc(&lines(100), &font).unwrap();
        assert_eq!(toc.page_count, 2);
        assert_eq!(toc.doc.get_pages().len(), 2);

        for (_, page_id) in toc.doc.get_pages() {
            let page = toc.doc.get_dictionary(page_id).unwrap();
            let resources_id = page.get(b"Resources").unwrap().as_reference().unwrap();
            let resources = toc.doc.get_dictionary(resources_id).unwrap();
            assert!(resources.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));

            let content = Content::decode(&toc.doc.get_page_content(page_id).unwrap()).unwrap();
            let tf = content
                .operations
                .iter()
                .find(|op| op.operator == "Tf")
                .unwrap();
            assert_eq!(tf.operands[0].as_name().unwrap(), b"F1");
        }
    }
}
