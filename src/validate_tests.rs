#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_resize_single_percentage() {
        let spec = parse_resize("50%").unwrap();
        assert_eq!(spec.width, Dim::Percent(50));
        assert_eq!(spec.height, Dim::Percent(50));
        assert_eq!(spec.gate, None);
        assert_eq!(spec.target(200, 100).unwrap(), (100, 50));
    }

    #[test]
    fn test_resize_absolute_and_mixed() {
        assert_eq!(parse_resize("100x150").unwrap().target(10, 10).unwrap(), (100, 150));
        assert_eq!(parse_resize("50%x100").unwrap().target(300, 10).unwrap(), (150, 100));
        assert_eq!(parse_resize("40x25%").unwrap().target(10, 400).unwrap(), (40, 100));
        assert_eq!(parse_resize("10%x20%").unwrap().target(100, 100).unwrap(), (10, 20));
        assert_eq!(parse_resize("64").unwrap().target(10, 20).unwrap(), (64, 64));
    }

    #[test]
    fn test_resize_percentage_truncates() {
        // 33% of 10 is 3.3
        assert_eq!(parse_resize("33%").unwrap().target(10, 10).unwrap(), (3, 3));
    }

    #[test]
    fn test_resize_zero_dimension_is_rejected() {
        let spec = parse_resize("1%").unwrap();
        assert_eq!(spec.target(50, 50), Err(ValidationError::Range("resize parameter(s)")));
        assert!(parse_resize("0x10").unwrap().target(5, 5).is_err());
    }

    #[test]
    fn test_resize_syntax_errors() {
        for bad in [
            "",
            "abc",
            "50%%",
            "x50",
            "50x",
            "50 x 50",
            "-5",
            "1.5x2",
            "50%>20x20>10x10",
            "5>1<2",
        ] {
            assert_eq!(
                parse_resize(bad),
                Err(ValidationError::Syntax("resize")),
                "{bad:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_resize_gate_uses_first_threshold_field() {
        let spec = parse_resize("30%>200x100").unwrap();
        assert_eq!(spec.gate, Some(ResizeGate::Larger(200)));

        let spec = parse_resize("200%<50x400").unwrap();
        assert_eq!(spec.gate, Some(ResizeGate::Smaller(50)));
    }

    #[test]
    fn test_resize_gate_rejects_percent_or_single_threshold() {
        assert_eq!(parse_resize("50%>200"), Err(ValidationError::Range("resize parameter(s)")));
        assert_eq!(parse_resize("50%>50%x20"), Err(ValidationError::Range("resize parameter(s)")));
        assert_eq!(parse_resize("50%<20x20%"), Err(ValidationError::Range("resize parameter(s)")));
    }

    #[test]
    fn test_gate_admits() {
        let larger = ResizeGate::Larger(200);
        assert!(!larger.admits(150, 150));
        assert!(!larger.admits(200, 200));
        assert!(larger.admits(250, 150));

        let smaller = ResizeGate::Smaller(200);
        assert!(smaller.admits(150, 300));
        assert!(!smaller.admits(200, 250));
    }

    #[test]
    fn test_crop_percentages_are_insets_on_far_edges() {
        let spec = parse_crop("10%,10%,10%,10%").unwrap();
        let cb = spec.resolve(100, 100).unwrap();
        assert_eq!(cb, CropBox { left: 10, upper: 10, right: 90, lower: 90 });
        assert_eq!((cb.width(), cb.height()), (80, 80));
    }

    #[test]
    fn test_crop_mixed_fields_with_spaces() {
        let spec = parse_crop("25%, 100, 250,  35%").unwrap();
        let cb = spec.resolve(400, 200).unwrap();
        assert_eq!(cb, CropBox { left: 100, upper: 100, right: 250, lower: 130 });
    }

    #[test]
    fn test_crop_invalid_boxes() {
        for bad in ["50,0,10,10", "0,50,10,10", "0,0,0,10", "0,0,10,0", "5,5,5,9"] {
            let spec = parse_crop(bad).unwrap();
            assert_eq!(spec.resolve(100, 100), Err(ValidationError::Range("cropping dimensions")));
        }
        // default: zero insets resolve to the full image
        assert!(parse_crop("0%,0%,0%,0%").unwrap().resolve(10, 10).is_ok());
    }

    #[test]
    fn test_crop_syntax_errors() {
        for bad in ["1,2,3", "1,2,3,4,5", " 1,2,3,4", "1 ,2,3,4", "a,b,c,d", "1,2,3,4%%"] {
            assert_eq!(parse_crop(bad), Err(ValidationError::Syntax("cropping")), "{bad:?}");
        }
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(parse_scale("0.5").unwrap(), 0.5);
        assert_eq!(parse_scale("2").unwrap(), 2.0);
        for bad in ["0", "-1", "abc", "", "inf", "NaN"] {
            assert!(parse_scale(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_border_width() {
        assert_eq!(parse_border("0").unwrap(), 0);
        assert_eq!(parse_border("12").unwrap(), 12);
        assert!(parse_border("-3").is_err());
        assert!(parse_border("1.5").is_err());
    }

    #[test]
    fn test_posterize_bounds() {
        assert_eq!(parse_posterize("1").unwrap(), 1);
        assert_eq!(parse_posterize("8").unwrap(), 8);
        assert!(parse_posterize("0").is_err());
        assert!(parse_posterize("9").is_err());
        assert!(parse_posterize("four").is_err());
    }

    #[test]
    fn test_solarize_threshold() {
        assert_eq!(parse_solarize("256").unwrap(), 256);
        assert!(parse_solarize("-1").is_err());
    }

    #[test]
    fn test_enhancement_factor() {
        assert_eq!(parse_factor("0").unwrap(), 0.0);
        assert_eq!(parse_factor("1.5").unwrap(), 1.5);
        assert!(parse_factor("-0.1").is_err());
        assert!(parse_factor("lots").is_err());
    }

    #[test]
    fn test_filetype() {
        assert_eq!(parse_filetype("PNG").unwrap(), ".png");
        assert_eq!(parse_filetype("WebP").unwrap(), ".webp");
        assert!(parse_filetype("").is_err());
        assert!(parse_filetype("../x").is_err());
    }
}
