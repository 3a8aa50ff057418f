//! Decode integration tests.
//!
//! Tests verify:
//! - The IFD scanner agrees with the frame decoder
//! - Per-page metadata is attached
//! - Non-RGBA sources are expanded to RGBA8, including bilevel and palette
//! - Long IFD chains decode in full
//! - Local files are read and typed by extension or an explicit media type

use std::io::Write;

use raster_viewer::{
    decode_multi_frame, decode_pages, scan_frames, DecodeError, DecodePath, FileSource,
    ImageViewer, LocalFile, RasterPage,
};

use super::test_utils::{
    create_gray_tiff, create_multi_page_tiff, create_packed_tiff, create_png,
    create_zero_frame_tiff, PackedFrame, BLACK_IS_ZERO, BLUE, GREEN, PACKBITS, PALETTE, RED,
    WHITE_IS_ZERO,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Ten 1-bit pixels per row, so every row carries six bits of padding.
const BILEVEL_ROWS: [u8; 4] = [0b1010_0000, 0b0100_0000, 0b0000_0000, 0b1100_0000];

fn pixel(page: &RasterPage, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * page.width() + x) * 4) as usize;
    let mut px = [0; 4];
    px.copy_from_slice(&page.pixels()[i..i + 4]);
    px
}

#[test]
fn test_scan_matches_decode() {
    let data = create_multi_page_tiff(&[(16, 8, RED), (4, 4, GREEN)]);

    let frames = scan_frames(&data).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!((frames[0].width, frames[0].height), (Some(16), Some(8)));
    assert_eq!((frames[1].width, frames[1].height), (Some(4), Some(4)));

    let pages = decode_multi_frame(&data).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].dimensions(), (16, 8));
    assert_eq!(pages[1].dimensions(), (4, 4));
}

#[test]
fn test_pages_carry_metadata() {
    let data = create_multi_page_tiff(&[(2, 2, RED)]);
    let pages = decode_multi_frame(&data).unwrap();

    let metadata = pages[0].metadata();
    assert_eq!(metadata.get("compression"), Some("None"));
    assert_eq!(metadata.get("photometric"), Some("RGB"));
    assert_eq!(metadata.get("samplesPerPixel"), Some("4"));
}

#[test]
fn test_gray_tiff_expands_to_rgba() {
    let data = create_gray_tiff(300, 2);
    let pages = decode_multi_frame(&data).unwrap();
    assert_eq!(pages.len(), 1);

    let pixels = pages[0].pixels();
    assert_eq!(pixels.len(), 300 * 2 * 4);
    // x = 7 on the first row
    assert_eq!(&pixels[7 * 4..8 * 4], &[7, 7, 7, 255]);
}

#[test]
fn test_bilevel_black_is_zero() {
    let data = create_packed_tiff(&[PackedFrame::gray(10, 2, 1, BLACK_IS_ZERO, &BILEVEL_ROWS)]);
    let pages = decode_multi_frame(&data).unwrap();
    let page = &pages[0];

    assert_eq!(page.dimensions(), (10, 2));
    assert_eq!(page.pixels().len(), 10 * 2 * 4);
    assert_eq!(pixel(page, 0, 0), WHITE);
    assert_eq!(pixel(page, 1, 0), BLACK);
    assert_eq!(pixel(page, 2, 0), WHITE);
    assert_eq!(pixel(page, 8, 0), BLACK);
    assert_eq!(pixel(page, 9, 0), WHITE);
    assert_eq!(pixel(page, 0, 1), BLACK);
    assert_eq!(pixel(page, 8, 1), WHITE);
    assert_eq!(pixel(page, 9, 1), WHITE);
    assert_eq!(page.metadata().get("photometric"), Some("BlackIsZero"));
}

#[test]
fn test_bilevel_white_is_zero() {
    let data = create_packed_tiff(&[PackedFrame::gray(10, 2, 1, WHITE_IS_ZERO, &BILEVEL_ROWS)]);
    let page = &decode_multi_frame(&data).unwrap()[0];

    assert_eq!(pixel(page, 0, 0), BLACK);
    assert_eq!(pixel(page, 1, 0), WHITE);
    assert_eq!(pixel(page, 9, 0), BLACK);
    assert_eq!(pixel(page, 0, 1), WHITE);
    assert_eq!(pixel(page, 8, 1), BLACK);
}

#[test]
fn test_packbits_bilevel() {
    // Rows 0xFFFF and 0x000F: a repeat run of two, then a literal run of two
    let strip = [0xFF, 0xFF, 0x01, 0x00, 0x0F];
    let frame = PackedFrame::gray(16, 2, 1, BLACK_IS_ZERO, &strip).compressed(PACKBITS);
    let page = &decode_multi_frame(&create_packed_tiff(&[frame])).unwrap()[0];

    assert!((0..16).all(|x| pixel(page, x, 0) == WHITE));
    assert!((0..12).all(|x| pixel(page, x, 1) == BLACK));
    assert!((12..16).all(|x| pixel(page, x, 1) == WHITE));
    assert_eq!(page.metadata().get("compression"), Some("PackBits"));
}

#[test]
fn test_four_bit_gray() {
    let frame = PackedFrame::gray(3, 1, 4, BLACK_IS_ZERO, &[0x0F, 0x50]);
    let page = &decode_multi_frame(&create_packed_tiff(&[frame])).unwrap()[0];
    assert_eq!(pixel(page, 0, 0), BLACK);
    assert_eq!(pixel(page, 1, 0), WHITE);
    assert_eq!(pixel(page, 2, 0), [85, 85, 85, 255]);
}

#[test]
fn test_palette_frames_expand_through_color_map() {
    let mut colormap = vec![0u16; 3 * 16];
    // Entry 1 is red, entry 2 is green, entry 3 is blue
    colormap[1] = 0xFFFF;
    colormap[16 + 2] = 0xFFFF;
    colormap[32 + 3] = 0xFF00;
    let bilevel = [0b1000_0000, 0b0100_0000];
    let frames = [
        PackedFrame::palette(3, 1, 4, &[0x12, 0x30], &colormap),
        PackedFrame::gray(2, 2, 1, BLACK_IS_ZERO, &bilevel),
    ];
    let data = create_packed_tiff(&frames);

    assert_eq!(scan_frames(&data).unwrap().len(), 2);
    let pages = decode_multi_frame(&data).unwrap();
    assert_eq!(pages.len(), 2);

    assert_eq!(pages[0].metadata().get("photometric"), Some("Palette"));
    assert_eq!(pixel(&pages[0], 0, 0), RED);
    assert_eq!(pixel(&pages[0], 1, 0), GREEN);
    assert_eq!(pixel(&pages[0], 2, 0), BLUE);

    assert_eq!(pages[1].index(), 1);
    assert_eq!(pixel(&pages[1], 0, 0), WHITE);
    assert_eq!(pixel(&pages[1], 1, 0), BLACK);
    assert_eq!(pixel(&pages[1], 1, 1), WHITE);
}

#[test]
fn test_palette_without_color_map_fails() {
    let frame = PackedFrame::gray(2, 1, 8, PALETTE, &[0, 1]);
    assert!(matches!(
        decode_multi_frame(&create_packed_tiff(&[frame])),
        Err(DecodeError::Decoder(_))
    ));
}

#[test]
fn test_more_than_a_thousand_frames() {
    let frames: Vec<(u32, u32, [u8; 4])> = (0..1100)
        .map(|i| (1, 1, if i == 1099 { BLUE } else { RED }))
        .collect();
    let data = create_multi_page_tiff(&frames);

    assert_eq!(scan_frames(&data).unwrap().len(), 1100);
    let pages = decode_multi_frame(&data).unwrap();
    assert_eq!(pages.len(), 1100);
    assert_eq!(pages[1099].index(), 1099);
    assert_eq!(&pages[1099].pixels()[..], &BLUE[..]);
}

#[test]
fn test_zero_frame_tiff() {
    let data = create_zero_frame_tiff();
    assert!(scan_frames(&data).unwrap().is_empty());
    assert!(matches!(
        decode_multi_frame(&data),
        Err(DecodeError::NoPages)
    ));
}

#[tokio::test]
async fn test_decode_pages_runs_both_paths() {
    let tiff = create_multi_page_tiff(&[(3, 3, RED), (3, 3, GREEN), (3, 3, BLUE)]);
    let pages = decode_pages(DecodePath::MultiFrame, tiff.into())
        .await
        .unwrap();
    assert_eq!(pages.len(), 3);

    let png = create_png(5, 6, GREEN);
    let pages = decode_pages(DecodePath::Native, png.into()).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].dimensions(), (5, 6));
    assert_eq!(pages[0].metadata().get("format"), Some("Png"));
}

#[tokio::test]
async fn test_png_on_multi_frame_path_fails() {
    let png = create_png(5, 6, GREEN);
    let result = decode_pages(DecodePath::MultiFrame, png.into()).await;
    assert!(matches!(result, Err(DecodeError::Tiff(_))));
}

#[tokio::test]
async fn test_load_local_file() {
    let mut file = tempfile::Builder::new().suffix(".tiff").tempfile().unwrap();
    file.write_all(&create_multi_page_tiff(&[(8, 8, RED), (8, 8, BLUE)]))
        .unwrap();
    file.flush().unwrap();

    let local = LocalFile::open(file.path()).await.unwrap();
    assert_eq!(local.media_type(), "image/tiff");
    assert!(local.size() > 0);

    let viewer = ImageViewer::default();
    let summary = viewer.load_file(Some(&local)).await.unwrap();
    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.file_info.size, local.size());
}

#[tokio::test]
async fn test_local_file_with_declared_media_type() {
    let mut file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
    file.write_all(&create_multi_page_tiff(&[(4, 4, GREEN)]))
        .unwrap();
    file.flush().unwrap();

    let local = LocalFile::open(file.path()).await.unwrap();
    assert_eq!(local.path(), file.path());
    assert_eq!(local.media_type(), "application/octet-stream");

    let viewer = ImageViewer::default();
    assert!(viewer.load_file(Some(&local)).await.is_err());

    let local = local.with_media_type("image/tiff");
    assert_eq!(local.media_type(), "image/tiff");
    let summary = viewer.load_file(Some(&local)).await.unwrap();
    assert_eq!(summary.page_count, 1);
    assert_eq!(summary.file_info.media_type, "image/tiff");
}

#[tokio::test]
async fn test_local_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = LocalFile::open(dir.path().join("missing.tif")).await;
    assert!(result.is_err());
}
