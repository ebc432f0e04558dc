use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec4;
use relume::recovery::{ContextRecovery, RecoveryOptions, RecoverySettings};
use relume::resources::{Material, Texture, TextureSlot};
use relume::surface::{HeadlessSurface, RenderSurface, SurfaceConfig};
use relume::{Scene, SphereOptions, create_sphere};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Globe scene: a sphere with a textured standard material
    let mut scene = Scene::new();
    let geometry = scene.assets.geometries.add(create_sphere(&SphereOptions {
        radius: 6.371,
        width_segments: 64,
        height_segments: 32,
    }));

    let albedo = scene.assets.textures.add(Texture::solid("earth_albedo", [40, 90, 160, 255]));
    let normal = scene.assets.textures.add(Texture::solid("earth_normal", [128, 128, 255, 255]));
    let lights = scene.assets.textures.add(Texture::solid("earth_lights", [255, 220, 140, 255]));
    let material = Material::new_standard(Vec4::ONE)
        .with_name("Earth")
        .with_texture(TextureSlot::Map, albedo)?
        .with_texture(TextureSlot::NormalMap, normal)?
        .with_texture(TextureSlot::EmissiveMap, lights)?;
    let material = scene.assets.materials.add(material);

    // Atmosphere shell: same sphere, untextured
    let atmosphere = scene.assets.materials.add(Material::new_basic(Vec4::new(0.5, 0.7, 1.0, 0.2)));

    let earth = scene.spawn_mesh("Earth", geometry, material);
    let shell = scene.spawn_mesh("Atmosphere", geometry, atmosphere);
    scene.attach(shell, earth);

    // 2. Surface and recovery handler
    let surface = HeadlessSurface::shared(SurfaceConfig {
        pixel_ratio: 2.0,
        width: 1280,
        height: 720,
        clear_color: wgpu::Color { r: 0.0, g: 0.0, b: 0.02, a: 1.0 },
    });
    let scene = Rc::new(RefCell::new(scene));

    let settings = RecoverySettings::from_json_str(r#"{ "enableLogging": true }"#)?;
    let recovery = ContextRecovery::attach(
        &surface,
        &scene,
        RecoveryOptions::new()
            .with_settings(settings)
            .on_context_lost(|| log::info!("demo: graphics paused"))
            .on_context_restored(|| log::info!("demo: graphics back"))
            .custom_restoration(|surface: &mut HeadlessSurface, _scene: &mut Scene| {
                log::info!("demo: custom restoration at {:?}", surface.current_config().physical_size());
                Ok(())
            }),
    )?;

    // 3. First frame uploads everything
    let stats = surface.borrow_mut().render(&mut scene.borrow_mut())?;
    log::info!("frame 1: {stats:?}");

    // 4. Lose the context, resize while it is gone, bring it back
    HeadlessSurface::lose_context(&surface);
    if let Err(err) = surface.borrow_mut().render(&mut scene.borrow_mut()) {
        log::info!("render while lost: {err}");
    }

    surface.borrow_mut().set_host_metrics(SurfaceConfig {
        pixel_ratio: 2.0,
        width: 1600,
        height: 900,
        clear_color: wgpu::Color { r: 0.0, g: 0.0, b: 0.02, a: 1.0 },
    });
    HeadlessSurface::restore_context(&surface)?;

    // 5. Next frame regenerates the GPU copies
    let stats = surface.borrow_mut().render(&mut scene.borrow_mut())?;
    log::info!("frame 2: {stats:?}");
    log::info!("recovery status: {:?}", recovery.status());

    Ok(())
}
