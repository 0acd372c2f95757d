use bluenoise_mask_optimizer::export::{read_literal_array, write_literal_array, write_ppm};
use bluenoise_mask_optimizer::settings::CHANNELS_PER_LAYER;
use bluenoise_mask_optimizer::{ConfigError, MaskBuffer, MaskSettings, Optimizer, PreviewFrame};

fn optimizer(size: usize, dimension: usize) -> Optimizer {
    let settings = MaskSettings::new(size, dimension).unwrap().with_seed(2024);
    Optimizer::new(settings).unwrap()
}

fn assert_in_range_and_padded(mask: &MaskBuffer) {
    let live = mask.dimension();
    let slots = CHANNELS_PER_LAYER * mask.layers();
    for pixel in 0..mask.pixel_count() {
        for component in 0..live {
            let value = mask.component(pixel, component);
            assert!((0.0..=1.0).contains(&value), "pixel {pixel}: {value}");
        }
        for component in live..slots {
            assert_eq!(mask.component(pixel, component), 0.0);
        }
    }
}

#[test]
fn single_iteration_on_the_smallest_mask() {
    let mut optimizer = optimizer(128, 1);
    let report = optimizer.run();

    let candidates = 128 * 128 / 2;
    assert_eq!(optimizer.permutation().len(), candidates);
    assert!(report.accepted as usize <= candidates);
    assert_eq!(optimizer.accepted_swap_count(), report.accepted);
}

#[test]
fn eight_dimensions_fill_two_layers_without_padding() {
    let optimizer = optimizer(256, 8);
    let settings = optimizer.settings();
    assert_eq!(settings.layers(), 2);
    assert_eq!(settings.padding(), 0);
    assert_eq!(optimizer.mask().layers(), 2);
    assert_in_range_and_padded(optimizer.mask());
}

#[test]
fn five_dimensions_pad_the_second_layer() {
    let optimizer = optimizer(128, 5);
    let mask = optimizer.mask();
    assert_eq!(optimizer.settings().layers(), 2);
    assert_eq!(optimizer.settings().padding(), 3);

    for pixel in 0..mask.pixel_count() {
        let second = mask.texel(1, pixel);
        assert_eq!(&second[1..], &[0.0; 3]);
        assert!((0.0..1.0).contains(&second[0]));
        assert!(mask.texel(0, pixel).iter().all(|v| (0.0..1.0).contains(v)));
    }
}

#[test]
fn non_power_of_two_sizes_round_up_before_validation() {
    assert_eq!(MaskSettings::new(200, 1).unwrap().mask_size(), 256);
    assert_eq!(MaskSettings::new(300, 1).unwrap().mask_size(), 512);
    assert_eq!(MaskSettings::new(1000, 1).unwrap().mask_size(), 1024);
    assert_eq!(MaskSettings::new(100, 1).unwrap().mask_size(), 128);
    assert_eq!(
        MaskSettings::new(1025, 1).unwrap_err(),
        ConfigError::InvalidMaskSize {
            requested: 1025,
            rounded: 2048
        }
    );
}

#[test]
fn values_and_padding_survive_many_passes() {
    let mut optimizer = optimizer(128, 7);
    let ran = optimizer.run_until(|report| report.iteration == 10);
    assert_eq!(ran, 10);
    assert_in_range_and_padded(optimizer.mask());
}

#[test]
fn accept_rate_drops_as_the_mask_settles() {
    let mut optimizer = optimizer(128, 1);
    let first = optimizer.run().accepted;
    let mut last = first;
    for _ in 0..30 {
        last = optimizer.run().accepted;
    }
    assert!(last < first, "first pass {first}, last pass {last}");
}

#[test]
fn exporting_twice_is_byte_identical() {
    let mut optimizer = optimizer(128, 3);
    optimizer.run();

    let export = |optimizer: &Optimizer| {
        let mut image = Vec::new();
        let mut literal = Vec::new();
        write_ppm(optimizer.mask(), &mut image).unwrap();
        write_literal_array(optimizer.mask(), &mut literal).unwrap();
        (image, literal)
    };
    assert_eq!(export(&optimizer), export(&optimizer));
    assert_eq!(
        PreviewFrame::capture(optimizer.mask()),
        PreviewFrame::capture(optimizer.mask())
    );
}

#[test]
fn literal_export_round_trips_after_optimization() {
    let mut optimizer = optimizer(128, 2);
    optimizer.run();
    optimizer.run();

    let mut literal = Vec::new();
    write_literal_array(optimizer.mask(), &mut literal).unwrap();
    let parsed = read_literal_array(std::str::from_utf8(&literal).unwrap()).unwrap();

    let mask = optimizer.mask();
    assert_eq!(parsed.size, mask.size());
    assert_eq!(parsed.dimension, 2);
    for pixel in 0..mask.pixel_count() {
        for component in 0..2 {
            let expected = mask.component(pixel, component) as f64;
            assert!((parsed.get(pixel, component) - expected).abs() <= 1e-10);
        }
    }
}
