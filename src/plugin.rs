//! Plugin for terrain layer compositing.
use bevy::prelude::*;

use crate::layers::LayerStack;
use crate::settings::CompositorSettings;

/// Plugin that adds a terrain [`LayerStack`] to a Bevy app.
///
/// This plugin inserts:
/// - [`CompositorSettings`] as a resource
/// - An empty [`LayerStack`] built from those settings
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_terrain_layers::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(TerrainLayersPlugin {
///         settings: CompositorSettings::default().with_ignore_negative_keys(true),
///     })
///     .run();
/// ```
#[derive(Default)]
pub struct TerrainLayersPlugin {
    pub settings: CompositorSettings,
}

impl Plugin for TerrainLayersPlugin {
    fn build(&self, app: &mut App) {
        debug!("terrain layers: {:?}", self.settings.resolution);
        app.insert_resource(self.settings.clone())
            .insert_resource(LayerStack::new(self.settings.clone()));
    }
}
