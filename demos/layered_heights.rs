//! Composites three height layers and prints the flattened result.
//!
//! - "ground": a procedural slope, Set
//! - "plateau": a raised square pasted over the middle, Additive
//! - "crater": a stencil-weighted dip claimed with a radial falloff
//!
//! Also places a few trees and removes one of them from a higher layer.

use bevy::log::LogPlugin;
use bevy::math::URect;
use bevy::prelude::*;
use bevy_terrain_layers::prelude::*;

const SIZE: u32 = 9;

fn main() {
    let mut app = App::new();
    app.add_plugins(LogPlugin::default())
        .add_plugins(TerrainLayersPlugin {
            settings: CompositorSettings::default()
                .with_resolution(LayerResolution::uniform(UVec2::splat(SIZE))),
        })
        .add_systems(Startup, (build_layers, report).chain());
    app.update();
}

fn build_layers(mut stack: ResMut<LayerStack>) -> Result {
    let ground = stack.get_or_create_layer("ground", LayerKind::Procedural);
    let plateau = stack.get_or_create_layer("plateau", LayerKind::Authored);
    let crater = stack.get_or_create_layer("crater", LayerKind::Authored);

    let slope = Grid2D::from_fn(SIZE, SIZE, |u, _| u as f32 / (SIZE - 1) as f32 * 0.2)?;
    let layer = stack.layer_mut(ground).ok_or("ground layer missing")?;
    layer.write_heights(0, 0, &slope)?;
    let oak = layer.add_tree(TreeInstance::new(0, Vec3::new(0.1, 0.0, 0.1)));
    layer.add_tree(TreeInstance::new(0, Vec3::new(0.9, 0.0, 0.9)).with_rotation(1.2));
    stack.invalidate_cache(Some(ground));

    let layer = stack.layer_mut(plateau).ok_or("plateau layer missing")?;
    layer.set_blend_mode(BlendMode::Additive);
    layer.write_heights(2, 2, &Grid2D::filled(5, 5, 0.3)?)?;
    layer.remove_tree(oak);
    stack.invalidate_cache(Some(plateau));

    let center = (SIZE - 1) as f32 / 2.0;
    let falloff = Grid2D::from_fn(SIZE, SIZE, |u, v| {
        let d = Vec2::new(u as f32 - center, v as f32 - center).length() / center;
        (1.0 - d).max(0.0)
    })?;
    let layer = stack.layer_mut(crater).ok_or("crater layer missing")?;
    layer.set_blend_mode(BlendMode::Stencil);
    layer.heights_mut().fill(0.05)?;
    let claimed = layer.claim_stencil(0, 0, &falloff, 1, false)?;
    info!("crater claimed {claimed} cells");
    stack.invalidate_cache(Some(crater));

    Ok(())
}

fn report(mut stack: ResMut<LayerStack>) -> Result {
    let rect = URect::new(0, 0, SIZE, SIZE);
    let heights = stack.resolve_compound_heights(None, true, rect)?;
    for v in 0..SIZE {
        let row: Vec<String> = (0..SIZE)
            .map(|u| heights.get(u, v).map(|h| format!("{h:.2}")))
            .collect::<Result<_, _>>()?;
        info!("{}", row.join(" "));
    }

    let trees = stack.resolve_compound_trees(None, true)?;
    info!("{} trees survive compositing", trees.len());
    Ok(())
}
