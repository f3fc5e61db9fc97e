use chrono::{Datelike, Timelike};
use groundtrack::io::metadata;
use groundtrack::io::FrameReader;
use groundtrack::TrackError;
use image::{GrayImage, Luma};
use std::io::Cursor;
use std::path::Path;

/// Small gradient raster; pixel content is irrelevant to reader tests
fn test_raster() -> GrayImage {
    GrayImage::from_fn(48, 32, |x, y| Luma([(x * 5 + y * 3) as u8]))
}

/// Encode a JPEG and splice in an EXIF APP1 segment with DateTimeOriginal
fn write_jpeg_with_capture_time(path: &Path, raster: &GrayImage, datetime: &str) {
    let mut jpeg = Vec::new();
    {
        let mut cursor = Cursor::new(&mut jpeg);
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, 90);
        encoder
            .encode(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                image::ColorType::L8,
            )
            .expect("Failed to encode JPEG");
    }

    let field = exif::Field {
        tag: exif::Tag::DateTimeOriginal,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Ascii(vec![datetime.as_bytes().to_vec()]),
    };
    let mut writer = exif::experimental::Writer::new();
    writer.push_field(&field);

    let mut tiff = Cursor::new(Vec::new());
    writer
        .write(&mut tiff, false)
        .expect("Failed to write EXIF block");
    let tiff = tiff.into_inner();

    // APP1 goes right after the SOI marker: FF E1, length, "Exif\0\0", TIFF
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);

    std::fs::write(path, out).expect("Failed to write JPEG file");
}

/// Plain JPEG without any EXIF segment
fn write_jpeg_without_metadata(path: &Path, raster: &GrayImage) {
    let mut jpeg = Vec::new();
    {
        let mut cursor = Cursor::new(&mut jpeg);
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, 90);
        encoder
            .encode(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                image::ColorType::L8,
            )
            .expect("Failed to encode JPEG");
    }
    std::fs::write(path, jpeg).expect("Failed to write JPEG file");
}

#[test]
fn test_read_frame_round_trip() {
    let _ = env_logger::try_init();

    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("photo_1.jpg");
    write_jpeg_with_capture_time(&path, &test_raster(), "2024:01:15 10:30:00");

    let frame = FrameReader::read_frame(&path).expect("Failed to read frame");

    assert_eq!(frame.id, "photo_1");
    assert_eq!(frame.raster.width(), 48);
    assert_eq!(frame.raster.height(), 32);
    assert_eq!(frame.captured_at.year(), 2024);
    assert_eq!(frame.captured_at.hour(), 10);
    assert_eq!(frame.captured_at.minute(), 30);
    assert_eq!(
        metadata::format_capture_time(&frame.captured_at),
        "2024:01:15 10:30:00"
    );
}

#[test]
fn test_read_frames_in_capture_order() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let raster = test_raster();

    let times = [
        "2024:01:15 10:30:00",
        "2024:01:15 10:30:14",
        "2024:01:15 10:30:28",
    ];
    for (i, time) in times.iter().enumerate() {
        let path = dir.path().join(format!("photo_{}.jpg", i + 1));
        write_jpeg_with_capture_time(&path, &raster, time);
    }

    let reader = FrameReader::from_dir(dir.path()).expect("Failed to create reader");
    assert_eq!(reader.len(), 3);

    let frames = reader.read_frames().expect("Failed to read frames");
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].id, "photo_1");
    assert_eq!(frames[2].id, "photo_3");

    for pair in frames.windows(2) {
        assert_eq!(metadata::elapsed_seconds(&pair[0], &pair[1]), 14);
    }
}

#[test]
fn test_unreadable_files_are_dropped() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let raster = test_raster();

    write_jpeg_with_capture_time(&dir.path().join("a.jpg"), &raster, "2024:01:15 10:30:00");
    write_jpeg_with_capture_time(&dir.path().join("b.jpg"), &raster, "2024:01:15 10:30:14");
    // No metadata and no pixels respectively; both must be skipped
    write_jpeg_without_metadata(&dir.path().join("c_no_exif.jpg"), &raster);
    std::fs::write(dir.path().join("d_notes.txt"), b"capture log").unwrap();

    let reader = FrameReader::from_dir(dir.path()).expect("Failed to create reader");
    assert_eq!(reader.len(), 4);

    let frames = reader.read_frames().expect("Failed to read frames");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].id, "a");
    assert_eq!(frames[1].id, "b");
}

#[test]
fn test_missing_exif_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("bare.jpg");
    write_jpeg_without_metadata(&path, &test_raster());

    let result = FrameReader::read_frame(&path);
    assert!(matches!(result, Err(TrackError::Exif(_))));
}

#[test]
fn test_malformed_capture_time_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("bad_time.jpg");
    // ISO 8601 instead of the EXIF layout
    write_jpeg_with_capture_time(&path, &test_raster(), "2024-01-15T10:30:00");

    let result = FrameReader::read_frame(&path);
    assert!(matches!(result, Err(TrackError::Metadata(_))));
}

#[test]
fn test_capture_time_survives_exif_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("photo.jpg");
    write_jpeg_with_capture_time(&path, &test_raster(), "2023:12:31 23:59:59");

    let captured_at = metadata::read_capture_time(&path).expect("Failed to read capture time");
    assert_eq!(
        metadata::format_capture_time(&captured_at),
        "2023:12:31 23:59:59"
    );
}
