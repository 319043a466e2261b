#[cfg(test)]
mod tests {
    use super::super::*;
    use image::{GenericImageView, GrayImage, Luma, Rgb, RgbImage};

    fn create_solid_color_image(width: u32, height: u32, color: Rgb<u8>) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
    }

    #[test]
    fn test_handle_names_from_path() {
        let handle = ImageHandle::from_image(
            create_solid_color_image(2, 2, Rgb([0, 0, 0])),
            "/tmp/in/Holiday.Photo.JPG",
        );
        assert_eq!(handle.file_name(), "Holiday.Photo.JPG");
        assert_eq!(handle.stem(), "Holiday.Photo");
        assert_eq!(handle.extension(), ".JPG");
        assert_eq!(handle.format, Some(ImageFormat::Jpeg));
        assert_eq!(handle.format_name(), "JPEG");
    }

    #[test]
    fn test_handle_without_extension() {
        let handle = ImageHandle::from_image(GrayImage::new(1, 1).into(), "README");
        assert_eq!(handle.extension(), "");
        assert_eq!(handle.format, None);
        assert_eq!(handle.format_name(), "UNKNOWN");
    }

    #[test]
    fn test_open_sniffs_content() {
        let dir = tempfile::tempdir().unwrap();
        // PNG bytes behind a misleading extension
        let path = dir.path().join("really_png.bmp");
        create_solid_color_image(3, 2, Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let handle = ImageHandle::open(&path).unwrap();
        assert_eq!(handle.format, Some(ImageFormat::Png));
        assert_eq!(handle.image.dimensions(), (3, 2));
    }

    #[test]
    fn test_open_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();
        assert!(ImageHandle::open(&path).is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(mode_name(&GrayImage::new(1, 1).into()), "L");
        assert_eq!(mode_name(&create_solid_color_image(1, 1, Rgb([0, 0, 0]))), "RGB");
        assert_eq!(mode_name(&DynamicImage::new_rgba16(1, 1)), "RGBA;16");
    }

    #[test]
    fn test_rgba8_for_rejects_deep_images() {
        assert!(rgba8_for(&DynamicImage::new_rgb16(2, 2), "posterize").is_err());
        let rgba = rgba8_for(&GrayImage::from_pixel(1, 1, Luma([7])).into(), "posterize").unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [7, 7, 7, 255]);
    }

    #[test]
    fn test_convert_like_round_trips_gray() {
        let gray: DynamicImage = GrayImage::from_pixel(2, 2, Luma([99])).into();
        let widened = DynamicImage::ImageRgba8(gray.to_rgba8());
        let back = convert_like(widened, ColorType::L8);
        assert_eq!(back.color(), ColorType::L8);
        assert_eq!(back.as_luma8().unwrap().get_pixel(1, 1).0, [99]);
    }

    #[test]
    fn test_paste_on_canvas_keeps_layout_and_fills_border() {
        let top = create_solid_color_image(2, 2, Rgb([255, 255, 255]));
        let fill: FillColor = "#ff0000".parse().unwrap();
        let out = paste_on_canvas(&top, 4, 4, 1, 1, fill);
        assert_eq!(out.color(), ColorType::Rgb8);
        assert_eq!(out.dimensions(), (4, 4));
        let rgb = out.as_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 1).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(3, 3).0, [255, 0, 0]);
    }

    #[test]
    fn test_paste_on_canvas_deep_image() {
        let top = DynamicImage::new_rgb16(2, 1);
        let out = paste_on_canvas(&top, 2, 3, 0, 1, FillColor::default());
        assert_eq!(out.color(), ColorType::Rgb16);
        assert_eq!(out.dimensions(), (2, 3));
    }
}
