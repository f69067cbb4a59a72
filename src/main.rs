//! Stagehand headless demo
//!
//! Builds a walled arena with bouncing movers and collectible coins, then
//! drives it with the fixed-step clock at a simulated 60 fps. Pass a JSON
//! settings file as the first argument to override the defaults.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use stagehand::Settings;
use stagehand::renderer::RecordingRenderer;
use stagehand::sim::{
    ActorDefinition, Behavior, BoundaryShape, Camera, FixedStep, Follow, GameEvent, KeyboardEvent,
    Layer, Scene, Stage,
};

const FRAME_DT: f32 = 1.0 / 60.0;
const WALL: f32 = 20.0;
const MOVERS: usize = 6;
const COINS: usize = 24;

fn define_actors(stage: &mut Stage, settings: &Settings) -> stagehand::Result<()> {
    stage.define_actor(
        ActorDefinition::new("wall_h")
            .with_boundary(BoundaryShape::rect(settings.scene_width, WALL)?)
            .solid(true)
            .with_sprite("wall_h"),
    )?;
    stage.define_actor(
        ActorDefinition::new("wall_v")
            .with_boundary(BoundaryShape::rect(WALL, settings.scene_height)?)
            .solid(true)
            .with_sprite("wall_v"),
    )?;
    stage.define_actor(
        ActorDefinition::new("coin")
            .with_boundary(BoundaryShape::circle(6.0))
            .with_sprite("coin"),
    )?;
    stage.define_actor(
        ActorDefinition::new("mover")
            .with_boundary(BoundaryShape::rect(16.0, 16.0)?)
            .with_behavior(Behavior::Motion)
            .with_sprite("mover")
            .on_step(|_, me| {
                // Turn when the move this step was fully blocked
                let blocked = me.motion.is_some_and(|m| m.previous == me.pos);
                if blocked && me.speed() > 0.0 {
                    me.set_direction(me.direction() + 135.0);
                }
                me.frame = (me.frame + 1) % 4;
            })
            .on_key("space", |_, me, _| me.set_speed(me.speed() * 1.5))
            .on_collision("coin", |ctx, me, coin| {
                ctx.destroy(coin);
                me.state.increment("coins", 1);
                ctx.emit(GameEvent::new("coin_collected").with_payload(me.id().0 as i64));
            })?,
    )?;
    Ok(())
}

fn build_arena(
    stage: &mut Stage,
    settings: &Settings,
    collected: Rc<Cell<u32>>,
) -> stagehand::Result<()> {
    let (w, h) = (settings.scene_width, settings.scene_height);
    if w <= 4.0 * WALL || h <= 4.0 * WALL {
        return Err(stagehand::Error::InvalidRect { width: w, height: h });
    }
    let scene = Scene::new("arena", w, h)?
        .with_camera(Camera::new("default", w / 2.0, h / 2.0)?.with_port(0.0, 0.0, w, h)?)
        .on_start(|scene, _| log::info!("Arena `{}` started", scene.name()))
        .on_game_event("coin_collected", move |_, _, _| collected.set(collected.get() + 1));
    stage.add_scene(scene)?;

    let (scene, sim) = stage.scene_with_sim("arena")?;
    scene.add_layer(Layer::new("world", 0))?;
    scene.add_layer(Layer::new("hud", 10).following_camera(None, Vec2::new(8.0, 8.0)))?;

    scene.create_instance(sim, "world", "wall_h", 0.0, 0.0)?;
    scene.create_instance(sim, "world", "wall_h", 0.0, h - WALL)?;
    scene.create_instance(sim, "world", "wall_v", 0.0, 0.0)?;
    scene.create_instance(sim, "world", "wall_v", w - WALL, 0.0)?;

    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let scatter = |rng: &mut Pcg32| {
        Vec2::new(
            rng.random_range(2.0 * WALL..w - 2.0 * WALL).round(),
            rng.random_range(2.0 * WALL..h - 2.0 * WALL).round(),
        )
    };

    for _ in 0..COINS {
        let at = scatter(&mut rng);
        scene.create_instance(sim, "world", "coin", at.x, at.y)?;
    }

    let mut first = None;
    for _ in 0..MOVERS {
        let at = scatter(&mut rng);
        let id = scene.create_instance(sim, "world", "mover", at.x, at.y)?;
        if let Some(mover) = scene.instance_mut(id) {
            mover.set_speed(rng.random_range(1.0..4.0_f32).round());
            mover.set_direction(rng.random_range(0.0..360.0_f32).round());
        }
        first.get_or_insert(id);
    }
    if let Some(id) = first {
        scene.camera_mut().set_follow(Some(Follow::new(id)));
    }
    Ok(())
}

fn main() -> stagehand::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    log::info!(
        "Stagehand demo starting ({} steps at {} Hz)",
        settings.demo_steps,
        settings.step_hz
    );

    let collected = Rc::new(Cell::new(0));
    let mut stage = Stage::new();
    define_actors(&mut stage, &settings)?;
    build_arena(&mut stage, &settings, collected.clone())?;
    stage.switch_to("arena")?;

    let mut clock = FixedStep::new(&settings);
    let mut renderer = RecordingRenderer::new();
    let mut steps = 0;
    let mut frames = 0u32;
    while steps < settings.demo_steps {
        steps += clock.advance(FRAME_DT, || stage.step());
        frames += 1;
        if frames % 120 == 0 {
            stage.on_keyboard_event(KeyboardEvent::down("space"));
        }
        renderer.clear();
        stage.draw(&mut renderer);
    }

    let arena = stage.scene("arena")?;
    let remaining = arena.layer("world")?.instances().of_actor("coin").count();
    log::info!(
        "Ran {steps} steps over {frames} frames: {} coins collected, {remaining} left",
        collected.get(),
    );
    log::info!(
        "Camera at {:?}, {} draw calls in last frame",
        arena.camera().pos,
        renderer.commands().len(),
    );
    Ok(())
}
