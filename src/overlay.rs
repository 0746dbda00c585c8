// src/overlay.rs

use crate::landmarks::{LandmarkFrame, POSE_CONNECTIONS};
use crate::pipeline::hud::{Bgr, Hud};
use anyhow::Result;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};

const JOINT_COLOR: Bgr = (245, 117, 66);
const BONE_COLOR: Bgr = (245, 66, 230);

fn scalar((b, g, r): Bgr) -> core::Scalar {
    core::Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

fn to_pixel(x: f32, y: f32, width: i32, height: i32) -> core::Point {
    core::Point::new((x * width as f32) as i32, (y * height as f32) as i32)
}

/// Draw bones and joints. Joints the model reports as off-frame or barely
/// visible are skipped.
pub fn draw_skeleton(frame: &mut Mat, landmarks: &LandmarkFrame) -> Result<()> {
    const MIN_DRAW_VISIBILITY: f32 = 0.5;
    if landmarks.is_empty() {
        return Ok(());
    }
    let (width, height) = (frame.cols(), frame.rows());

    for &(a, b) in POSE_CONNECTIONS.iter() {
        let (Some(pa), Some(pb)) = (
            landmarks.visible(a, MIN_DRAW_VISIBILITY),
            landmarks.visible(b, MIN_DRAW_VISIBILITY),
        ) else {
            continue;
        };
        imgproc::line(
            frame,
            to_pixel(pa.x, pa.y, width, height),
            to_pixel(pb.x, pb.y, width, height),
            scalar(BONE_COLOR),
            2,
            imgproc::LINE_AA,
            0,
        )?;
    }

    for point in landmarks.points() {
        if point.visibility <= MIN_DRAW_VISIBILITY {
            continue;
        }
        imgproc::circle(
            frame,
            to_pixel(point.x, point.y, width, height),
            2,
            scalar(JOINT_COLOR),
            -1,
            imgproc::LINE_8,
            0,
        )?;
    }

    Ok(())
}

pub fn draw_hud(frame: &mut Mat, hud: &Hud) -> Result<()> {
    for panel in &hud.panels {
        imgproc::rectangle(
            frame,
            core::Rect::new(panel.x, panel.y, panel.width, panel.height),
            scalar(panel.color),
            -1,
            imgproc::LINE_8,
            0,
        )?;
    }

    for text in &hud.texts {
        imgproc::put_text(
            frame,
            &text.text,
            core::Point::new(text.origin.0, text.origin.1),
            imgproc::FONT_HERSHEY_SIMPLEX,
            text.scale,
            scalar(text.color),
            text.thickness,
            imgproc::LINE_AA,
            false,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::tests::uniform_frame;
    use crate::pipeline::hud;

    fn blank(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, core::Scalar::all(0.0))
            .unwrap()
    }

    #[test]
    fn test_panel_fills_rectangle() {
        let mut frame = blank(640, 480);
        let overlay = Hud::new().panel(0, 0, 400, 140, hud::PANEL_BLUE);
        draw_hud(&mut frame, &overlay).unwrap();

        let inside = frame.at_2d::<core::Vec3b>(70, 200).unwrap();
        assert_eq!([inside[0], inside[1], inside[2]], [245, 117, 16]);
        let outside = frame.at_2d::<core::Vec3b>(300, 500).unwrap();
        assert_eq!([outside[0], outside[1], outside[2]], [0, 0, 0]);
    }

    fn lit_pixels(frame: &Mat) -> i32 {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0).unwrap();
        core::count_non_zero(&gray).unwrap()
    }

    #[test]
    fn test_text_marks_pixels() {
        let mut frame = blank(640, 480);
        let overlay = Hud::new().text("Jumps: 12", (20, 80), 1.2, hud::RED, 3);
        draw_hud(&mut frame, &overlay).unwrap();
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn test_invisible_skeleton_draws_nothing() {
        let mut frame = blank(64, 64);
        draw_skeleton(&mut frame, &uniform_frame(0.1)).unwrap();
        assert_eq!(lit_pixels(&frame), 0);
    }
}
