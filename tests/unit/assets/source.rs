use super::*;

#[test]
fn parse_recognizes_data_uri() {
    let src = ImageSource::parse("data:image/png;base64,AAAA");
    assert_eq!(
        src,
        ImageSource::DataUri {
            subtype: "png",
            payload: "AAAA"
        }
    );
    assert!(ImageSource::is_data_uri("  data:image/jpeg;base64,/9j/  "));
}

#[test]
fn parse_falls_back_to_path() {
    for input in [
        "uploads/stickers/cat.png",
        "data:image/;base64,AAAA",
        "data:image/svg+xml;base64,AAAA",
        "data:text/plain;base64,AAAA",
        "data:image/png,AAAA",
    ] {
        assert!(
            matches!(ImageSource::parse(input), ImageSource::Path(_)),
            "{input}"
        );
    }
}

#[test]
fn subtype_mapping_covers_supported_formats() {
    assert_eq!(format_for_subtype("jpeg").unwrap(), ImageFormat::Jpeg);
    assert_eq!(format_for_subtype("JPG").unwrap(), ImageFormat::Jpeg);
    assert_eq!(format_for_subtype("png").unwrap(), ImageFormat::Png);
    assert_eq!(format_for_subtype("gif").unwrap(), ImageFormat::Gif);
    assert_eq!(format_for_subtype("webp").unwrap(), ImageFormat::WebP);
    assert!(matches!(
        format_for_subtype("bmp"),
        Err(CamagruError::Decode(_))
    ));
}

#[test]
fn base64_decodes_and_ignores_whitespace() {
    assert_eq!(decode_base64_payload("aGVsbG8=", 64).unwrap(), b"hello");
    assert_eq!(decode_base64_payload("aGVs\nbG8=", 64).unwrap(), b"hello");
}

#[test]
fn base64_rejects_garbage_and_empty() {
    assert!(decode_base64_payload("!!!not base64!!!", 64).is_err());
    assert!(decode_base64_payload("", 64).is_err());
}

#[test]
fn base64_enforces_limit_before_decoding() {
    let payload = "A".repeat(400);
    let err = decode_base64_payload(&payload, 100).unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn estimate_is_an_upper_bound() {
    assert_eq!(estimate_decoded_len(""), 0);
    assert_eq!(estimate_decoded_len("aGVsbG8="), 6);
    assert_eq!(estimate_decoded_len("aGVsbG8"), 6);
}

#[test]
fn is_data_uri_accepts_short_lived_input() {
    let owned = format!("data:image/{};base64,AAAA", "webp");
    assert!(ImageSource::is_data_uri(&owned));
    drop(owned);
    assert!(!ImageSource::is_data_uri(&String::from("stickers/a.png")));
}
