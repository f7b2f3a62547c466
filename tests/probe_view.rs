//! Tests for the probe path: frame in, model-view PNG out.

#[allow(dead_code)]
mod common;

use common::{solid_frame, strided_frame};
use game_pilot::probe::model_view_image;
use game_pilot::{InputSpec, Layout};
use pilot_prep::plan::Size;

#[test]
fn model_view_matches_spec_geometry() {
    let frame = solid_frame(Size { w: 320, h: 200 }, [10, 20, 200, 255]);
    let img = model_view_image(&frame, InputSpec::square(128, Layout::Nhwc)).unwrap();
    assert_eq!((img.width(), img.height()), (128, 128));
    // BGRA [10, 20, 200] comes out as RGB [200, 20, 10].
    assert_eq!(img.get_pixel(64, 64).0, [200, 20, 10]);
}

#[test]
fn strided_frames_go_through_staging() {
    let frame = strided_frame(Size { w: 64, h: 64 }, [0, 255, 0, 255], 24);
    let img = model_view_image(&frame, InputSpec::square(64, Layout::Nhwc)).unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0]);
    assert_eq!(img.get_pixel(63, 63).0, [0, 255, 0]);
}

#[test]
fn probe_png_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("view.png");

    let frame = solid_frame(Size { w: 96, h: 96 }, [30, 60, 90, 255]);
    let img = model_view_image(&frame, InputSpec::square(64, Layout::Nhwc)).unwrap();
    img.save(&path).unwrap();

    let loaded = image::open(&path).unwrap().to_rgb8();
    assert_eq!((loaded.width(), loaded.height()), (64, 64));
    assert_eq!(loaded.get_pixel(32, 32).0, [90, 60, 30]);
}
