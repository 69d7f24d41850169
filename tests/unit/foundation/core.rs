use super::*;

const CANVAS: Dimensions = Dimensions {
    width: 400,
    height: 300,
};
const STICKER: Dimensions = Dimensions {
    width: 100,
    height: 50,
};

#[test]
fn default_placement_centers_at_native_size() {
    let r = Placement::default().resolve(CANVAS, STICKER).unwrap();
    assert_eq!(
        r,
        ResolvedPlacement {
            x: 150,
            y: 125,
            width: 100,
            height: 50
        }
    );
}

#[test]
fn centering_uses_scaled_size() {
    let r = Placement::centered(2.0).resolve(CANVAS, STICKER).unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (100, 100, 200, 100));
}

#[test]
fn explicit_coordinates_truncate_toward_zero() {
    let r = Placement::at(10.9, -3.7, 1.0)
        .resolve(CANVAS, STICKER)
        .unwrap();
    assert_eq!((r.x, r.y), (10, -3));
}

#[test]
fn partial_placement_centers_missing_axis() {
    let p = Placement {
        x: Some(5.0),
        y: None,
        scale: None,
    };
    let r = p.resolve(CANVAS, STICKER).unwrap();
    assert_eq!((r.x, r.y), (5, 125));
}

#[test]
fn invalid_scale_is_rejected() {
    for s in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = Placement::centered(s).resolve(CANVAS, STICKER).unwrap_err();
        assert!(matches!(err, CamagruError::Validation(_)), "scale {s}");
    }
}

#[test]
fn tiny_scale_keeps_at_least_one_pixel() {
    let r = Placement::at(0.0, 0.0, 0.0001)
        .resolve(CANVAS, STICKER)
        .unwrap();
    assert_eq!((r.width, r.height), (1, 1));
}

#[test]
fn oversized_scale_is_rejected() {
    let err = Placement::at(0.0, 0.0, 1000.0)
        .resolve(CANVAS, STICKER)
        .unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn clip_inside_is_identity() {
    let r = ResolvedPlacement {
        x: 10,
        y: 20,
        width: 30,
        height: 40,
    };
    let c = r.clip_to(CANVAS).unwrap();
    assert_eq!(
        c,
        ClippedRegion {
            dst_x: 10,
            dst_y: 20,
            src_x: 0,
            src_y: 0,
            width: 30,
            height: 40
        }
    );
}

#[test]
fn clip_negative_origin_offsets_source() {
    let r = ResolvedPlacement {
        x: -10,
        y: -5,
        width: 30,
        height: 20,
    };
    let c = r.clip_to(CANVAS).unwrap();
    assert_eq!((c.dst_x, c.dst_y), (0, 0));
    assert_eq!((c.src_x, c.src_y), (10, 5));
    assert_eq!((c.width, c.height), (20, 15));
}

#[test]
fn clip_overflowing_right_and_bottom() {
    let r = ResolvedPlacement {
        x: 390,
        y: 290,
        width: 30,
        height: 30,
    };
    let c = r.clip_to(CANVAS).unwrap();
    assert_eq!((c.width, c.height), (10, 10));
}

#[test]
fn clip_fully_outside_is_none() {
    let outside = [
        (400, 0),
        (0, 300),
        (-30, 0),
        (0, -30),
        (i64::MAX, i64::MAX),
    ];
    for (x, y) in outside {
        let r = ResolvedPlacement {
            x,
            y,
            width: 30,
            height: 30,
        };
        assert!(r.clip_to(CANVAS).is_none(), "({x},{y})");
    }
}

#[test]
fn placement_json_fields_are_optional() {
    let p: Placement = serde_json::from_str(r#"{"x":150,"y":150}"#).unwrap();
    assert_eq!(p.x, Some(150.0));
    assert_eq!(p.scale, None);
    assert_eq!(p.scale_or_default(), 1.0);

    let empty: Placement = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, Placement::default());

    assert!(serde_json::from_str::<Placement>(r#"{"rotation":1}"#).is_err());
}
