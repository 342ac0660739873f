// Full frames through GameManager with in-memory backends
use glyph_engine::builtin::{KeyCode, ScriptedInput, ViewObject};
use glyph_engine::prelude::*;
use glyph_engine::{EngineError, EventKind};
use std::cell::RefCell;
use std::rc::Rc;

fn fast_config() -> EngineConfig {
    EngineConfig::from_json_str(r#"{ "frame": { "target_ms": 1 } }"#).unwrap()
}

/// Shares its screen with the test after the game takes ownership
#[derive(Clone, Default)]
struct SharedDisplay(Rc<RefCell<MemoryDisplay>>);

impl RenderBackend for SharedDisplay {
    fn width(&self) -> usize {
        self.0.borrow().width()
    }

    fn height(&self) -> usize {
        self.0.borrow().height()
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }

    fn put_cell(&mut self, x: usize, y: usize, ch: char, color: ColorPair) {
        self.0.borrow_mut().put_cell(x, y, ch, color);
    }

    fn render(&mut self) -> Result<()> {
        self.0.borrow_mut().render()
    }
}

struct BrokenDisplay;

impl RenderBackend for BrokenDisplay {
    fn start_up(&mut self) -> Result<()> {
        Err(EngineError::IoError("no terminal".to_string()))
    }

    fn width(&self) -> usize {
        80
    }

    fn height(&self) -> usize {
        24
    }

    fn clear(&mut self) {}

    fn put_cell(&mut self, _x: usize, _y: usize, _ch: char, _color: ColorPair) {}

    fn render(&mut self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_startup_failure_shuts_down_world() {
    let mut game = GameManager::new(
        &fast_config(),
        Box::new(BrokenDisplay),
        Box::new(ScriptedInput::default()),
    )
    .unwrap();

    let err = game.start_up().unwrap_err();
    assert!(matches!(err, EngineError::SubsystemStartup(_)));
    assert!(!game.is_started());
    assert!(!game.world().is_started());
    assert!(!game.input().is_started());
    assert!(!game.resources().is_started());
}

#[test]
fn test_keys_move_player_and_draw() -> Result<()> {
    let display = SharedDisplay::default();
    let mut game = GameManager::new(
        &fast_config(),
        Box::new(display.clone()),
        Box::new(ScriptedInput::new([KeyCode::Right, KeyCode::Right, KeyCode::Down])),
    )?;
    game.start_up()?;

    let frame = Frame::from_rows(1, &["@"]).unwrap();
    game.resources()
        .register(Sprite::new("hero", 1, 1, vec![frame], ColorPair::default(), 1))?;

    let hero = game.world_mut().spawn(
        ObjectBuilder::new("Hero").at(5.0, 5.0).sprite("hero"),
        FnBehavior::new(|world, me, event| {
            let Event::Keyboard { key } = event else {
                return Ok(false);
            };
            let Some(position) = world.get(me).map(|o| o.position) else {
                return Ok(false);
            };
            let step = match key {
                KeyCode::Right => Vector::new(1.0, 0.0),
                KeyCode::Down => Vector::new(0.0, 1.0),
                _ => return Ok(false),
            };
            world.move_object(me, position + step)
        })
        .with_interest(EventKind::Keyboard),
    )?;

    assert_eq!(game.run_frames(2)?, 2);
    assert_eq!(game.world().get(hero).map(|o| o.position), Some(Vector::new(7.0, 6.0)));

    let screen = display.0.borrow();
    assert_eq!(screen.screen().char_at(7, 6), Some('@'));
    assert_eq!(screen.screen().char_at(5, 5), Some(' '));
    assert_eq!(screen.frames_rendered(), 2);
    Ok(())
}

#[test]
fn test_hud_counts_steps() -> Result<()> {
    let display = SharedDisplay::default();
    let mut game = GameManager::new(
        &fast_config(),
        Box::new(display.clone()),
        Box::new(ScriptedInput::default()),
    )?;
    game.start_up()?;

    ViewObject::new("Steps").spawn(game.world_mut())?;
    game.world_mut().spawn(
        ObjectBuilder::new("Ticker").solidness(Solidness::Spectral),
        FnBehavior::new(|world, _, _| {
            world.dispatch(&Event::ViewUpdate {
                tag: "Steps".to_string(),
                value: 1,
                delta: true,
            });
            Ok(true)
        })
        .with_interest(EventKind::Step),
    )?;

    game.run_frames(5)?;
    assert!(display.0.borrow().screen().row(1).contains("|Steps 5|"));
    Ok(())
}

#[test]
fn test_game_over_flag_from_outside() -> Result<()> {
    let mut game = GameManager::new(
        &fast_config(),
        Box::new(MemoryDisplay::new(40, 10)),
        Box::new(ScriptedInput::default()),
    )?;
    game.start_up()?;
    assert_eq!(game.world().view().horizontal, 40.0);

    let flag = game.game_over();
    game.world_mut().spawn(
        ObjectBuilder::new("Timer"),
        FnBehavior::new(move |_, _, event| {
            if let Event::Step { count: 3 } = event {
                flag.set(true);
            }
            Ok(true)
        })
        .with_interest(EventKind::Step),
    )?;

    assert_eq!(game.run(), Ok(4));
    Ok(())
}
