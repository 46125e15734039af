//! Library-level round trips between rasters, documents and script text

use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::BTreeSet;
use sumimg::encoder::{encode_bitmap, encode_image, Bitmap, EncodeOptions};
use sumimg::fmt::{to_sum_string, to_sum_string_with, FormatOptions};
use sumimg::models::{BackgroundMode, CanvasSize, Frame, RowEntry, SumDocument};
use sumimg::parser::parse_str;
use sumimg::renderer::{render_frame, render_frames, FOREGROUND, OPAQUE_BACKGROUND};

fn bitmaps() -> Vec<Bitmap> {
    vec![
        Bitmap::new(1, 1),
        Bitmap::from_fn(1, 1, |_, _| true),
        Bitmap::from_fn(7, 5, |x, y| x == y),
        Bitmap::from_fn(9, 4, |x, y| (x + y) % 2 == 0),
        Bitmap::from_fn(12, 6, |x, y| y % 3 == 0 || x > 9),
        Bitmap::from_fn(33, 2, |x, _| x % 4 != 1),
    ]
}

fn bitmap_image(bitmap: &Bitmap) -> RgbaImage {
    RgbaImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if bitmap.get(x, y) {
            FOREGROUND
        } else {
            OPAQUE_BACKGROUND
        }
    })
}

#[test]
fn test_bitmap_survives_text_round_trip() {
    for dedupe_rows in [false, true] {
        let options = FormatOptions { dedupe_rows };
        for bitmap in bitmaps() {
            let document = encode_bitmap(&bitmap, false).unwrap();
            let text = to_sum_string_with(&document, &options);

            let parsed = parse_str(&text).unwrap();
            assert!(parsed.warnings.is_empty(), "{:?} for\n{}", parsed.warnings, text);
            assert_eq!(parsed.document, document);

            let frame = &parsed.document.frames()[0];
            let image = render_frame(frame, document.canvas(), document.background());
            assert_eq!(image, bitmap_image(&bitmap));
        }
    }
}

#[test]
fn test_black_and_white_image_is_reproduced_exactly() {
    let bitmap = Bitmap::from_fn(16, 9, |x, y| (x * 3 + y) % 7 < 3);
    let source = bitmap_image(&bitmap);

    let document = encode_image(&DynamicImage::ImageRgba8(source.clone()), &EncodeOptions::default())
        .unwrap();
    assert_eq!(document.background(), BackgroundMode::Opaque);

    let reparsed = parse_str(&to_sum_string(&document)).unwrap().document;
    assert_eq!(render_frames(&reparsed), vec![source]);
}

#[test]
fn test_serialization_is_stable() {
    let text = "!sum1.0\ns=5x3;\nbpx=t;\nb{\n1:1-2,5;\n3:d1;\n}\n";
    let document = parse_str(text).unwrap().document;
    let options = FormatOptions { dedupe_rows: true };

    let once = to_sum_string_with(&document, &options);
    let twice = to_sum_string_with(&parse_str(&once).unwrap().document, &options);
    assert_eq!(once, twice);
    assert_eq!(once, text);
}

#[test]
fn test_animation_round_trip_keeps_frames_and_rate() {
    let canvas = CanvasSize::new(4, 2).unwrap();
    let frames = vec![
        Frame::new(vec![RowEntry::new(1, BTreeSet::from([1, 2]))]),
        Frame::new(vec![]),
        Frame::new(vec![
            RowEntry::new(1, BTreeSet::from([4])),
            RowEntry::new(2, BTreeSet::from([4])),
        ]),
    ];
    let document =
        SumDocument::new("1.1", canvas, BackgroundMode::Transparent, Some(12.5), frames).unwrap();

    let text = to_sum_string_with(&document, &FormatOptions { dedupe_rows: true });
    assert!(text.contains("fps=12.5"));
    assert!(text.contains("2:d1;"));
    assert_eq!(text.matches("f{").count(), 3);

    let parsed = parse_str(&text).unwrap();
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.document, document);

    let images = render_frames(&parsed.document);
    assert_eq!(images.len(), 3);
    assert_eq!(*images[2].get_pixel(3, 1), FOREGROUND);
    assert_eq!(*images[1].get_pixel(3, 1), Rgba([255, 255, 255, 0]));
}
