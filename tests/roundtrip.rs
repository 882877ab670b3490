use std::fs;
use std::path::Path;

use waybitmaps::*;

fn checkerboard(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * bpp;
            if (x + y) % 2 == 0 {
                for c in 0..bpp {
                    pixels[off + c] = 200 + (c as u8 * 20);
                }
            } else {
                for c in 0..bpp {
                    pixels[off + c] = 10 + (c as u8 * 30);
                }
            }
        }
    }
    pixels
}

fn noise_pattern(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

fn build_image(w: u32, h: u32, color_type: ColorType, format: ImageFormat, data: &[u8]) -> Image {
    let mut image = Image::new(w, h, color_type, format).unwrap();
    image.pixels_mut().copy_from_slice(data);
    image
}

// ── BMP ──────────────────────────────────────────────────────────────

#[test]
fn bmp_roundtrip_2x2() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.bmp");

    // rows top-to-bottom: red, green / blue, white
    let pixels = [
        255, 0, 0, 0, 255, 0, //
        0, 0, 255, 255, 255, 255,
    ];
    let image = build_image(2, 2, ColorType::Rgb, ImageFormat::Bmp, &pixels);
    save_image(&image, &path).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!(back.width, 2);
    assert_eq!(back.height, 2);
    assert_eq!(back.color_type, ColorType::Rgb);
    assert_eq!(back.stride, 6);
    assert_eq!(back.pixels(), &pixels[..]);
}

#[test]
fn bmp_layout_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.bmp");
    let image = build_image(2, 2, ColorType::Rgb, ImageFormat::Bmp, &noise_pattern(2, 2, 3));
    save_image(&image, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    // width 2 -> 6 pixel bytes per row, padded to 8
    assert_eq!(bytes.len(), 54 + 8 * 2);
    assert_eq!(&bytes[0..2], b"BM");
    assert_eq!(u32::from_le_bytes(bytes[2..6].try_into().unwrap()), 70); // file size
    assert_eq!(u32::from_le_bytes(bytes[10..14].try_into().unwrap()), 54); // data offset
    assert_eq!(u32::from_le_bytes(bytes[14..18].try_into().unwrap()), 40); // header size
    assert_eq!(i32::from_le_bytes(bytes[18..22].try_into().unwrap()), 2); // width
    assert_eq!(i32::from_le_bytes(bytes[22..26].try_into().unwrap()), 2); // height
    assert_eq!(u16::from_le_bytes(bytes[26..28].try_into().unwrap()), 1); // planes
    assert_eq!(u16::from_le_bytes(bytes[28..30].try_into().unwrap()), 24); // bpp
    assert_eq!(u32::from_le_bytes(bytes[30..34].try_into().unwrap()), 0); // BI_RGB
    assert_eq!(i32::from_le_bytes(bytes[38..42].try_into().unwrap()), 2835); // ppm
}

#[test]
fn bmp_odd_width_pads_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.bmp");

    let pixels = checkerboard(3, 2, 3);
    let image = build_image(3, 2, ColorType::Rgb, ImageFormat::Bmp, &pixels);
    save_image(&image, &path).unwrap();

    // 9 pixel bytes per row, padded to 12 on disk
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 54 + 12 * 2);

    // padding is discarded on load
    let back = load_image(&path).unwrap();
    assert_eq!(back.stride, 9);
    assert_eq!(back.pixels(), &pixels[..]);
}

#[test]
fn bmp_top_down_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("td.bmp");

    let pixels = noise_pattern(4, 3, 3);
    let mut image = build_image(4, 3, ColorType::Rgb, ImageFormat::Bmp, &pixels);
    image.params = FormatParams::Bmp(BmpParams {
        top_down: true,
        ..Default::default()
    });
    save_image(&image, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(i32::from_le_bytes(bytes[22..26].try_into().unwrap()), -3);

    let back = load_image(&path).unwrap();
    assert_eq!(back.pixels(), &pixels[..]);
    match back.params {
        FormatParams::Bmp(params) => assert!(params.top_down),
        other => panic!("expected BMP params, got {other:?}"),
    }
}

#[test]
fn bmp_rle8_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rle.bmp");

    let image = build_image(2, 2, ColorType::Rgb, ImageFormat::Bmp, &noise_pattern(2, 2, 3));
    save_image(&image, &path).unwrap();

    // flip the compression field to BI_RLE8
    let mut bytes = fs::read(&path).unwrap();
    bytes[30..34].copy_from_slice(&1u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    match load_image(&path) {
        Err(CodecError::UnsupportedFormat(_)) => {}
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

// ── PPM / PGM ────────────────────────────────────────────────────────

#[test]
fn ppm_binary_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.ppm");

    let pixels = noise_pattern(4, 3, 3);
    let image = build_image(4, 3, ColorType::Rgb, ImageFormat::Ppm, &pixels);
    save_image(&image, &path).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!(back.color_type, ColorType::Rgb);
    assert_eq!(back.pixels(), &pixels[..]);
    assert_eq!(
        back.params,
        FormatParams::Pnm(PnmParams {
            ascii: false,
            max_val: 255
        })
    );
}

#[test]
fn ppm_ascii_equals_binary() {
    let dir = tempfile::tempdir().unwrap();

    let pixels = [
        255, 0, 0, 0, 255, 0, //
        0, 0, 255, 255, 255, 255,
    ];
    let mut image = build_image(2, 2, ColorType::Rgb, ImageFormat::Ppm, &pixels);

    let ascii_path = dir.path().join("a.ppm");
    image.params = FormatParams::Pnm(PnmParams {
        ascii: true,
        max_val: 255,
    });
    save_image(&image, &ascii_path).unwrap();

    let binary_path = dir.path().join("b.ppm");
    image.params = FormatParams::Pnm(PnmParams {
        ascii: false,
        max_val: 255,
    });
    save_image(&image, &binary_path).unwrap();

    let ascii_text = fs::read(&ascii_path).unwrap();
    assert!(ascii_text.starts_with(b"P3\n2 2\n255\n"));

    let from_ascii = load_image(&ascii_path).unwrap();
    let from_binary = load_image(&binary_path).unwrap();
    assert_eq!(from_ascii.pixels(), from_binary.pixels());
    assert_eq!(from_ascii.pixels(), &pixels[..]);
}

#[test]
fn ppm_ascii_comments_and_maxval_scaling() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.ppm");
    fs::write(
        &path,
        "P3 # the magic\n# a 1x2 image\n1 2\n100\n100 50 0\n# last row\n0 25 100\n",
    )
    .unwrap();

    let image = load_image(&path).unwrap();
    assert_eq!((image.width, image.height), (1, 2));
    // samples rescale as s * 255 / 100
    assert_eq!(image.pixels(), &[255, 127, 0, 0, 63, 255]);
}

#[test]
fn ppm_maxval_one_is_binary_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m1.ppm");
    fs::write(&path, b"P6\n2 1\n1\n\x01\x00\x01\x00\x01\x00".as_slice()).unwrap();

    let image = load_image(&path).unwrap();
    assert_eq!(image.pixels(), &[255, 0, 255, 0, 255, 0]);
}

#[test]
fn ppm_16bit_binary_decode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.ppm");

    // one pixel, max_val 65535, big-endian samples
    let mut data = b"P6\n1 1\n65535\n".to_vec();
    data.extend_from_slice(&65535u16.to_be_bytes());
    data.extend_from_slice(&32768u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    fs::write(&path, &data).unwrap();

    let image = load_image(&path).unwrap();
    assert_eq!(image.pixels(), &[255, 127, 0]);
}

#[test]
fn ppm_rejects_out_of_range_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ppm");
    fs::write(&path, "P3\n1 1\n10\n11 0 0\n").unwrap();

    match load_image(&path) {
        Err(CodecError::Decode(_)) => {}
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[test]
fn pgm_roundtrip_both_variants() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = noise_pattern(5, 4, 1);
    let mut image = build_image(5, 4, ColorType::Gray, ImageFormat::Pgm, &pixels);

    for ascii in [false, true] {
        let path = dir.path().join(if ascii { "a.pgm" } else { "b.pgm" });
        image.params = FormatParams::Pnm(PnmParams {
            ascii,
            max_val: 255,
        });
        save_image(&image, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back.color_type, ColorType::Gray);
        assert_eq!(back.pixels(), &pixels[..]);
    }
}

#[test]
fn pgm_magic_does_not_load_as_ppm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.ppm");
    fs::write(&path, "P2\n1 1\n255\n7\n").unwrap();

    match load_image(&path) {
        Err(CodecError::Decode(_)) => {}
        other => panic!("expected Decode, got {other:?}"),
    }
}

// ── PNG ──────────────────────────────────────────────────────────────

#[test]
fn png_roundtrip_rgb_and_rgba() {
    let dir = tempfile::tempdir().unwrap();

    for (color_type, bpp) in [(ColorType::Rgb, 3), (ColorType::Rgba, 4)] {
        let path = dir.path().join(format!("{bpp}.png"));
        let pixels = noise_pattern(7, 5, bpp);
        let image = build_image(7, 5, color_type, ImageFormat::Png, &pixels);
        save_image(&image, &path).unwrap();

        let back = load_image(&path).unwrap();
        assert_eq!(back.color_type, color_type);
        assert_eq!(back.bit_depth, 8);
        assert_eq!(back.pixels(), &pixels[..]);
        assert_eq!(back.params, FormatParams::Png(PngParams::default()));
    }
}

#[test]
fn png_roundtrip_gray_and_gray_alpha() {
    let dir = tempfile::tempdir().unwrap();

    for (color_type, bpp) in [(ColorType::Gray, 1), (ColorType::GrayAlpha, 2)] {
        let path = dir.path().join(format!("g{bpp}.png"));
        let pixels = checkerboard(6, 6, bpp);
        let image = build_image(6, 6, color_type, ImageFormat::Png, &pixels);
        save_image(&image, &path).unwrap();

        let back = load_image(&path).unwrap();
        assert_eq!(back.color_type, color_type);
        assert_eq!(back.pixels(), &pixels[..]);
    }
}

#[test]
fn png_bad_signature_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not.png");
    fs::write(&path, b"\x89PNGnope.").unwrap();

    match load_image(&path) {
        Err(CodecError::Decode(_)) => {}
        other => panic!("expected Decode, got {other:?}"),
    }
}

// ── JPEG ─────────────────────────────────────────────────────────────

/// 150x100 synthetic gradient, saved as PNG, converted to JPEG at
/// quality 90, reloaded.
#[test]
fn gradient_png_converts_to_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let png_path = dir.path().join("g.png");
    let jpg_path = dir.path().join("g.jpg");

    let (w, h) = (150u32, 100u32);
    let mut gradient = Image::new(w, h, ColorType::Rgb, ImageFormat::Png).unwrap();
    let stride = gradient.stride;
    for y in 0..h as usize {
        for x in 0..w as usize {
            let off = y * stride + x * 3;
            let px = gradient.pixels_mut();
            px[off] = (x * 255 / (w as usize - 1)) as u8;
            px[off + 1] = (y * 255 / (h as usize - 1)) as u8;
            px[off + 2] = 128;
        }
    }
    save_image(&gradient, &png_path).unwrap();

    let mut image = load_image(&png_path).unwrap();
    image.set_format(ImageFormat::Jpeg);
    image.params = FormatParams::Jpeg(JpegParams {
        quality: 90,
        ..Default::default()
    });
    save_image(&image, &jpg_path).unwrap();

    let back = load_image(&jpg_path).unwrap();
    assert_eq!(back.width, 150);
    assert_eq!(back.height, 100);
    assert_eq!(back.color_type, ColorType::Rgb);
    assert_eq!(back.stride, 150 * 3);
    assert!(!back.has_alpha);
    assert!(back.is_opaque);
}

#[test]
fn jpeg_progressive_encode_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.jpg");

    let mut image = build_image(
        16,
        16,
        ColorType::Rgb,
        ImageFormat::Jpeg,
        &checkerboard(16, 16, 3),
    );
    image.params = FormatParams::Jpeg(JpegParams {
        progressive: true,
        subsampling: Subsampling::S444,
        ..Default::default()
    });
    save_image(&image, &path).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!((back.width, back.height), (16, 16));
    assert_eq!(back.color_type, ColorType::Rgb);
}

#[test]
fn jpeg_rejects_bad_quality() {
    let mut image = build_image(
        2,
        2,
        ColorType::Rgb,
        ImageFormat::Jpeg,
        &noise_pattern(2, 2, 3),
    );
    image.params = FormatParams::Jpeg(JpegParams {
        quality: 0,
        ..Default::default()
    });
    match save_image(&image, "/tmp/never-written.jpg") {
        Err(CodecError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

// ── XBM ──────────────────────────────────────────────────────────────

#[test]
fn xbm_roundtrip_uses_basename_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cursor-mask.xbm");

    // 10x2: alternating bits, second row inverted
    let mut image = Image::new(10, 2, ColorType::Gray, ImageFormat::Xbm).unwrap();
    for x in 0..10usize {
        image.pixels_mut()[x] = if x % 2 == 0 { 255 } else { 0 };
        image.pixels_mut()[10 + x] = if x % 2 == 0 { 0 } else { 255 };
    }
    save_image(&image, &path).unwrap();

    let source = fs::read_to_string(&path).unwrap();
    assert!(source.contains("#define cursor_mask_width 10"));
    assert!(source.contains("#define cursor_mask_height 2"));
    assert!(source.contains("static unsigned char cursor_mask_bits[]"));

    let back = load_image(&path).unwrap();
    assert_eq!(back.color_type, ColorType::Gray);
    assert_eq!(back.bit_depth, 1);
    assert_eq!(back.pixels(), image.pixels());
    assert_eq!(
        back.params,
        FormatParams::Xbm {
            name: "cursor_mask".into()
        }
    );
}

#[test]
fn xbm_accepts_decimal_and_hex_literals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.xbm");
    fs::write(
        &path,
        "#define probe_width 8\n#define probe_height 2\n\
         static unsigned char probe_bits[] = {\n  0x0F, 240, };\n",
    )
    .unwrap();

    let image = load_image(&path).unwrap();
    assert_eq!((image.width, image.height), (8, 2));
    // LSB-first: 0x0F lights pixels 0..4, 240 lights pixels 4..8
    let expected: Vec<u8> = (0..8)
        .map(|x| if x < 4 { 255 } else { 0 })
        .chain((0..8).map(|x| if x >= 4 { 255 } else { 0 }))
        .collect();
    assert_eq!(image.pixels(), &expected[..]);
}

// ── XPM ──────────────────────────────────────────────────────────────

#[test]
fn xpm_roundtrip_rgb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icon.xpm");

    let pixels = [
        255, 0, 0, 0, 255, 0, //
        0, 0, 255, 255, 0, 0,
    ];
    let image = build_image(2, 2, ColorType::Rgb, ImageFormat::Xpm, &pixels);
    save_image(&image, &path).unwrap();

    let source = fs::read_to_string(&path).unwrap();
    assert!(source.starts_with("/* XPM */"));
    assert!(source.contains("static char *icon[]"));
    assert!(source.contains("\"2 2 3 1\""));

    let back = load_image(&path).unwrap();
    assert_eq!(back.color_type, ColorType::Rgb);
    assert_eq!(back.pixels(), &pixels[..]);
    assert_eq!(back.params, FormatParams::Xpm { name: "icon".into() });
}

#[test]
fn xpm_none_entry_loads_as_rgba() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.xpm");
    fs::write(
        &path,
        "/* XPM */\nstatic char *t[] = {\n\
         \"2 1 2 1\",\n\
         \"  c None\", /* transparent */\n\
         \". c #FF8000\",\n\
         \" .\"};\n",
    )
    .unwrap();

    let image = load_image(&path).unwrap();
    assert_eq!(image.color_type, ColorType::Rgba);
    assert!(image.has_alpha);
    assert_eq!(image.pixels(), &[0, 0, 0, 0, 255, 128, 0, 255]);
}

#[test]
fn xpm_transparent_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alpha.xpm");

    let pixels = [0, 0, 0, 0, 10, 20, 30, 255];
    let image = build_image(2, 1, ColorType::Rgba, ImageFormat::Xpm, &pixels);
    save_image(&image, &path).unwrap();

    let back = load_image(&path).unwrap();
    assert_eq!(back.color_type, ColorType::Rgba);
    assert_eq!(back.pixels(), &pixels[..]);
}

#[test]
fn xpm_row_length_mismatch_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.xpm");
    fs::write(
        &path,
        "static char *short_rows[] = {\n\"2 1 1 1\",\n\". c #000000\",\n\".\"};\n",
    )
    .unwrap();

    match load_image(&path) {
        Err(CodecError::Decode(_)) => {}
        other => panic!("expected Decode, got {other:?}"),
    }
}

// ── 1x1 of every format ──────────────────────────────────────────────

#[test]
fn one_by_one_roundtrips() {
    let dir = tempfile::tempdir().unwrap();

    for format in [
        ImageFormat::Png,
        ImageFormat::Bmp,
        ImageFormat::Ppm,
        ImageFormat::Xpm,
    ] {
        let path = dir.path().join(format!("one.{}", format.name()));
        let image = build_image(1, 1, ColorType::Rgb, format, &[200, 100, 50]);
        save_image(&image, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!((back.width, back.height), (1, 1), "{format:?}");
        assert_eq!(back.pixels(), &[200, 100, 50], "{format:?}");
    }

    for format in [ImageFormat::Pgm, ImageFormat::Xbm] {
        let path = dir.path().join(format!("one.{}", format.name()));
        let image = build_image(1, 1, ColorType::Gray, format, &[255]);
        save_image(&image, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!((back.width, back.height), (1, 1), "{format:?}");
        assert_eq!(back.pixels(), &[255], "{format:?}");
    }

    // JPEG is lossy; dimensions and color type only
    let path = dir.path().join("one.jpg");
    let image = build_image(1, 1, ColorType::Rgb, ImageFormat::Jpeg, &[200, 100, 50]);
    save_image(&image, &path).unwrap();
    let back = load_image(&path).unwrap();
    assert_eq!((back.width, back.height), (1, 1));
    assert_eq!(back.color_type, ColorType::Rgb);
}

// ── Facade edge cases ────────────────────────────────────────────────

#[test]
fn unknown_extension_fails_without_touching_fs() {
    // the path does not exist; an UnsupportedFormat error proves the
    // extension check came first
    match load_image("/nonexistent/dir/image.tiff") {
        Err(CodecError::UnsupportedFormat(_)) => {}
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn empty_and_extensionless_paths_are_invalid() {
    match load_image("") {
        Err(CodecError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
    match load_image("/nonexistent/noextension") {
        Err(CodecError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
    let image = Image::new(1, 1, ColorType::Rgb, ImageFormat::Png).unwrap();
    match save_image(&image, "") {
        Err(CodecError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    match load_image("/nonexistent/dir/image.png") {
        Err(CodecError::Io { .. }) => {}
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn save_unknown_format_is_unsupported() {
    let mut image = Image::new(1, 1, ColorType::Rgb, ImageFormat::Png).unwrap();
    image.set_format(ImageFormat::Unknown);
    match save_image(&image, "/tmp/never-written.png") {
        Err(CodecError::UnsupportedFormat(_)) => {}
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn limits_reject_large_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.ppm");
    let image = build_image(
        4,
        4,
        ColorType::Rgb,
        ImageFormat::Ppm,
        &noise_pattern(4, 4, 3),
    );
    save_image(&image, &path).unwrap();

    let limits = Limits {
        max_dimension: Some(2),
        ..Default::default()
    };
    match load_image_with_limits(&path, &limits) {
        Err(CodecError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    // a 4x4 RGB image decodes into 48 bytes
    let limits = Limits {
        max_alloc_bytes: Some(16),
        ..Default::default()
    };
    match load_image_with_limits(&path, &limits) {
        Err(CodecError::LimitExceeded(_)) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    assert!(load_image(&path).is_ok());
}

// keep Path in the prelude used; extension lookup is case-insensitive
#[test]
fn extension_lookup_folds_case() {
    let dir = tempfile::tempdir().unwrap();
    let path: &Path = &dir.path().join("CAPS.PPM");
    let image = build_image(1, 1, ColorType::Rgb, ImageFormat::Ppm, &[1, 2, 3]);
    save_image(&image, path).unwrap();
    assert_eq!(load_image(path).unwrap().pixels(), &[1, 2, 3]);
}
