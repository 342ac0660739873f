//! Terminal demo: glyphs bouncing around the screen and off each other.
//!
//! Usage: `glyph_demo [config.json]`. Press `q` then Enter to quit; the
//! terminal stays line-buffered. Logs go to `log.file` when configured,
//! otherwise to stderr.

use glyph_engine::builtin::{ChannelInput, KeyCode, Location, ViewObject};
use glyph_engine::prelude::*;
use glyph_engine::{logging, EventKind};
use tracing::info;

const BALL: &str = "<HEADER>
frames 4
width 1
height 1
slowdown 3
color yellow
</HEADER>
<BODY>
o
end
O
end
0
end
O
end
</BODY>
";

fn bouncer() -> FnBehavior {
    FnBehavior::new(|world, me, event| {
        match event {
            Event::Collision { mover, .. } if *mover == me => {
                if let Some(ball) = world.get_mut(me) {
                    let velocity = ball.velocity();
                    ball.set_velocity(-velocity);
                }
                world.dispatch(&Event::ViewUpdate {
                    tag: "Bounces".to_string(),
                    value: 1,
                    delta: true,
                });
            }
            Event::Step { .. } => {
                let view = *world.view();
                if let Some(ball) = world.get_mut(me) {
                    let next = ball.predict_position();
                    let mut velocity = ball.velocity();
                    if next.x < view.corner.x || next.x >= view.far_corner().x {
                        velocity.x = -velocity.x;
                    }
                    if next.y < view.corner.y || next.y >= view.far_corner().y {
                        velocity.y = -velocity.y;
                    }
                    ball.set_velocity(velocity);
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    })
    .named("Bouncer")
    .with_interest(EventKind::Step)
}

fn quitter() -> FnBehavior {
    FnBehavior::new(|world, _, event| {
        if let Event::Keyboard {
            key: KeyCode::Char('q') | KeyCode::Escape,
        } = event
        {
            info!("quit requested");
            world.set_game_over();
        }
        Ok(true)
    })
    .named("Quitter")
    .with_interest(EventKind::Keyboard)
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let _guard = logging::init(&config.log)?;

    let display = TerminalDisplay::stdout(config.display.width, config.display.height);
    let input = ChannelInput::stdin()?;
    let mut game = GameManager::new(&config, Box::new(display), Box::new(input))?;
    game.start_up()?;

    game.resources().load_sprite_from_str(BALL, "ball")?;
    let world = game.world_mut();
    let starts = [
        (Vector::new(10.0, 5.0), Vector::new(1.0, 0.5)),
        (Vector::new(40.0, 12.0), Vector::new(-1.0, 0.5)),
        (Vector::new(70.0, 20.0), Vector::new(0.5, -1.0)),
        (Vector::new(25.0, 25.0), Vector::new(-0.5, -0.5)),
    ];
    for (position, velocity) in starts {
        world.spawn(
            ObjectBuilder::new("Ball")
                .position(position)
                .velocity(velocity)
                .sprite("ball"),
            bouncer(),
        )?;
    }
    world.spawn(
        ObjectBuilder::new("Quitter")
            .solidness(Solidness::Spectral)
            .visible(false),
        quitter(),
    )?;
    ViewObject::new("Bounces")
        .at(Location::TopRight)
        .with_color(ColorPair::new(Color::LightCyan, Color::Black))
        .spawn(world)?;
    ViewObject::new("q to quit")
        .at(Location::BottomLeft)
        .with_draw_value(false)
        .with_border(false)
        .spawn(world)?;

    let frames = game.run()?;
    info!(frames, "demo finished");
    game.shut_down();
    Ok(())
}
