// Atlas packing, texture directory loading and UV mapping

use frd_tools_lib::texture_pipeline::mapping::tile_corners;
use frd_tools_lib::texture_pipeline::tile::smallest_atlas_size;
use frd_tools_lib::texture_pipeline::{
    load_directory, AtlasMapping, AtlasOptions, AtlasPacker, Placement, TexturePair,
};
use frd_tools_lib::Error;
use image::{GrayImage, Luma, Rgb, RgbImage};
use proptest::prelude::*;
use tempfile::TempDir;

mod common;

use common::{cutout_mask, opaque_mask, write_texture_pair, TextureFixture, UNIT_CORNERS};

fn pair(id: i32, size: u32) -> TexturePair {
    TexturePair {
        id,
        albedo: RgbImage::from_pixel(size, size, Rgb([id as u8, 0, 0])),
        mask: GrayImage::from_pixel(size, size, Luma([255])),
        is_cutout: false,
    }
}

fn overlaps(a: &Placement, b: &Placement) -> bool {
    a.x < b.x + b.tile_size
        && b.x < a.x + a.tile_size
        && a.y < b.y + b.tile_size
        && b.y < a.y + a.tile_size
}

fn assert_disjoint(packer: &AtlasPacker) {
    let placed: Vec<&Placement> = packer.placements().collect();
    for (i, a) in placed.iter().enumerate() {
        assert!(a.x + a.tile_size <= packer.size() && a.y + a.tile_size <= packer.size());
        for b in &placed[i + 1..] {
            assert!(!overlaps(a, b), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn packs_64_64_32_then_rejects_128() {
    let mut packer = AtlasPacker::new(128).unwrap();
    for (id, size) in [(1, 64), (2, 64), (3, 32)] {
        packer.pack(&pair(id, size)).unwrap();
    }
    assert_disjoint(&packer);

    let layout: Vec<String> = packer
        .placements()
        .map(|p| format!("{} @ {},{} ({}px)", p.id, p.x, p.y, p.tile_size))
        .collect();
    insta::assert_debug_snapshot!(layout, @r###"
    [
        "1 @ 0,0 (64px)",
        "2 @ 64,0 (64px)",
        "3 @ 0,64 (32px)",
    ]
    "###);

    match packer.pack(&pair(4, 128)) {
        Err(Error::PackingExhausted { id: 4, size: 128, .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(packer.placements().count(), 3);
}

#[test]
fn same_input_gives_identical_atlas() {
    let pairs: Vec<TexturePair> = [32, 8, 64, 16, 8, 32]
        .iter()
        .enumerate()
        .map(|(i, &size)| pair(i as i32, size))
        .collect();
    let a = AtlasPacker::build(128, &pairs).unwrap();
    let b = AtlasPacker::build(128, &pairs).unwrap();
    assert_eq!(
        a.placements().collect::<Vec<_>>(),
        b.placements().collect::<Vec<_>>()
    );
    assert_eq!(a.canvas(), b.canvas());
    assert_eq!(a.mask(), b.mask());
}

#[test]
fn oversize_texture_is_a_hard_failure() {
    let pairs = vec![pair(1, 8), pair(2, 256)];
    assert!(matches!(
        AtlasPacker::build(128, &pairs),
        Err(Error::PackingExhausted { id: 2, .. })
    ));
}

proptest! {
    #[test]
    fn packed_tiles_never_overlap(
        sizes in prop::collection::vec(prop::sample::select(vec![8u32, 16, 32, 64]), 1..60)
    ) {
        let mut packer = AtlasPacker::new(128).unwrap();
        for (id, &size) in sizes.iter().enumerate() {
            let _ = packer.try_pack(&pair(id as i32, size));
        }
        assert_disjoint(&packer);
    }

    #[test]
    fn largest_first_fills_any_set_that_fits(
        mut sizes in prop::collection::vec(prop::sample::select(vec![8u32, 16, 32, 64, 128]), 1..80)
    ) {
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        let mut area = 0u32;
        sizes.retain(|&s| {
            let fits = area + s * s <= 128 * 128;
            if fits {
                area += s * s;
            }
            fits
        });

        let mut packer = AtlasPacker::new(128).unwrap();
        for (id, &size) in sizes.iter().enumerate() {
            prop_assert!(packer.pack(&pair(id as i32, size)).is_ok());
        }
        assert_disjoint(&packer);
    }

    #[test]
    fn tile_corners_are_normalized(level in 0u32..5, slot in 0u32..256) {
        let size = 8u32 << level;
        let per_row = 128 / size;
        let (x, y) = ((slot % per_row) * size, ((slot / per_row) % per_row) * size);
        let corners = tile_corners(x, y, size, 128);
        for [u, v] in corners {
            prop_assert!((0.0..=1.0).contains(&u));
            prop_assert!((0.0..=1.0).contains(&v));
        }
        prop_assert_eq!(corners[0][1], 1.0 - y as f64 / 128.0);
        prop_assert_eq!(corners[2][1], 1.0 - (y + size) as f64 / 128.0);
    }
}

#[test]
fn directory_pairs_are_loaded_in_id_order() {
    let dir = TempDir::new().unwrap();
    write_texture_pair(dir.path(), 20, 16, [0, 255, 0], &cutout_mask(16));
    write_texture_pair(dir.path(), 3, 32, [255, 0, 0], &opaque_mask(32));
    std::fs::write(dir.path().join("readme.txt"), "not a texture").unwrap();
    std::fs::create_dir(dir.path().join("7")).unwrap();

    let pairs = load_directory(dir.path()).unwrap();
    let ids: Vec<i32> = pairs.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 20]);
    assert!(!pairs[0].is_cutout);
    assert!(pairs[1].is_cutout);
    assert_eq!(pairs[1].size(), 16);
    assert_eq!(pairs[1].albedo.get_pixel(5, 5), &Rgb([0, 255, 0]));
}

#[test]
fn unpaired_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    write_texture_pair(dir.path(), 1, 8, [0; 3], &opaque_mask(8));
    RgbImage::new(8, 8).save(dir.path().join("2.png")).unwrap();
    assert!(matches!(
        load_directory(dir.path()),
        Err(Error::InvalidTextureDirectory { .. })
    ));

    let dir = TempDir::new().unwrap();
    opaque_mask(8).save(dir.path().join("5-a.png")).unwrap();
    assert!(matches!(
        load_directory(dir.path()),
        Err(Error::InvalidTextureDirectory { .. })
    ));

    let missing = dir.path().join("missing");
    assert!(matches!(
        load_directory(&missing),
        Err(Error::InvalidTextureDirectory { .. })
    ));
}

#[test]
fn non_square_texture_is_rejected() {
    let dir = TempDir::new().unwrap();
    RgbImage::new(16, 8).save(dir.path().join("1.png")).unwrap();
    GrayImage::new(16, 8).save(dir.path().join("1-a.png")).unwrap();
    assert!(matches!(
        load_directory(dir.path()),
        Err(Error::DimensionMismatch { id: 1, .. })
    ));
}

#[test]
fn atlas_images_and_mapping_are_written() {
    let textures = TempDir::new().unwrap();
    write_texture_pair(textures.path(), 10, 64, [10, 20, 30], &opaque_mask(64));
    write_texture_pair(textures.path(), 20, 64, [40, 50, 60], &cutout_mask(64));
    write_texture_pair(textures.path(), 30, 32, [70, 80, 90], &opaque_mask(32));

    let pairs = load_directory(textures.path()).unwrap();
    let size = smallest_atlas_size(pairs.iter().map(|p| p.size()));
    assert_eq!(size, 128);
    let packer = AtlasPacker::build(size, &pairs).unwrap();

    let out = TempDir::new().unwrap();
    let (albedo_path, mask_path) = packer.save(&out.path().join("track")).unwrap();
    assert_eq!(albedo_path, out.path().join("track.png"));
    assert_eq!(mask_path, out.path().join("track-a.png"));

    let albedo = image::open(&albedo_path).unwrap().into_rgb8();
    let mask = image::open(&mask_path).unwrap().into_luma8();
    assert_eq!(albedo.dimensions(), (128, 128));
    assert_eq!(albedo.get_pixel(70, 10), &Rgb([40, 50, 60]));
    assert_eq!(albedo.get_pixel(5, 70), &Rgb([70, 80, 90]));
    // the cutout pixel of texture 20 sits at its tile corner
    assert_eq!(mask.get_pixel(64, 0), &Luma([0]));
    assert_eq!(mask.get_pixel(65, 0), &Luma([255]));

    let mapping = AtlasMapping::from_packer(&packer);
    let json_path = out.path().join("track-uv_mapping.json");
    mapping.write_json(&json_path).unwrap();
    assert_eq!(AtlasMapping::read_json(&json_path).unwrap(), mapping);

    let entry = mapping.get(30).unwrap();
    assert_eq!((entry.x, entry.y, entry.texture_size, entry.atlas_size), (0, 64, 32, 128));
    assert_eq!(
        entry.corners,
        [[0.0, 0.5], [0.25, 0.5], [0.25, 0.25], [0.0, 0.25]]
    );
}

#[test]
fn track_textures_are_remapped_into_tiles() {
    let mut packer = AtlasPacker::new(128).unwrap();
    packer.pack(&pair(100, 64)).unwrap();
    packer.pack(&pair(101, 32)).unwrap();

    let mut fixture = common::one_segment_track();
    fixture.textures[1] = TextureFixture {
        texture: 101,
        corners: [0.0, 0.0, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5],
    };
    let track = frd_tools_lib::decode(&fixture.to_bytes()).unwrap();

    let options = AtlasOptions {
        shift_y: 0.0,
        ..Default::default()
    };
    let mapping = AtlasMapping::remap_track(&packer, &track, options.shift_y).unwrap();
    // only usage 1 is referenced by a polygon
    assert_eq!(mapping.len(), 1);
    let entry = mapping.get(1).unwrap();
    assert_eq!(entry.id, 101);
    assert_eq!((entry.x, entry.y), (64, 0));
    assert_eq!(
        entry.corners,
        [[0.5, 1.0], [0.625, 1.0], [0.625, 0.875], [0.5, 0.875]]
    );

    let shifted = AtlasMapping::remap_track(&packer, &track, 0.5).unwrap();
    assert_eq!(shifted.get(1).unwrap().corners[2], [0.625, 0.375]);

    fixture.textures[1].corners = UNIT_CORNERS;
    fixture.textures[1].texture = 555;
    let track = frd_tools_lib::decode(&fixture.to_bytes()).unwrap();
    assert!(matches!(
        AtlasMapping::remap_track(&packer, &track, 0.0),
        Err(Error::MissingAtlasTexture {
            usage: 1,
            texture: 555
        })
    ));
}

#[test]
fn options_load_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("atlas.json");
    std::fs::write(&path, r#"{"atlas_size": 512, "shift_y": 0.5}"#).unwrap();
    let options = AtlasOptions::from_json_file(&path).unwrap();
    assert_eq!(options.atlas_size, 512);
    assert_eq!(options.shift_y, 0.5);
}
