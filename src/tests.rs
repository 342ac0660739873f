// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cross-module tests: handlers mutating the world mid-dispatch

#[cfg(test)]
mod tests {
    #![allow(clippy::module_inception)]
    use crate::behavior::{FnBehavior, Inert};
    use crate::display::{MemoryDisplay, RenderBackend};
    use crate::entity::{EntityId, ObjectBuilder, Solidness};
    use crate::event::{Event, EventKind};
    use crate::geometry::Vector;
    use crate::resources::{ColorPair, Frame, ResourceManager, Sprite};
    use crate::world::WorldManager;
    use crate::{EngineConfig, Result};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Seen = Rc<RefCell<Vec<EntityId>>>;

    fn step_recorder(seen: &Seen) -> FnBehavior {
        let seen = seen.clone();
        FnBehavior::new(move |_, me, _| {
            seen.borrow_mut().push(me);
            Ok(true)
        })
        .with_interest(EventKind::Step)
    }

    fn spawn_recorders(world: &mut WorldManager, seen: &Seen, n: usize) -> Vec<EntityId> {
        (0..n)
            .map(|i| {
                world
                    .spawn(ObjectBuilder::new(format!("R{i}")), step_recorder(seen))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_unsubscribe_unvisited_during_dispatch() -> Result<()> {
        let mut world = WorldManager::default();
        let seen: Seen = Rc::default();
        let victim: Rc<RefCell<Option<EntityId>>> = Rc::default();

        let target = victim.clone();
        let log = seen.clone();
        let first = world.spawn(
            ObjectBuilder::new("Silencer"),
            FnBehavior::new(move |world, me, _| {
                log.borrow_mut().push(me);
                if let Some(id) = *target.borrow() {
                    world.unregister_interest(id, EventKind::Step);
                }
                Ok(true)
            })
            .with_interest(EventKind::Step),
        )?;
        let others = spawn_recorders(&mut world, &seen, 2);
        *victim.borrow_mut() = Some(others[1]);

        assert_eq!(world.dispatch(&Event::Step { count: 0 }), 2);
        assert_eq!(*seen.borrow(), vec![first, others[0]]);
        Ok(())
    }

    #[test]
    fn test_self_delete_during_dispatch() -> Result<()> {
        let mut world = WorldManager::default();
        let seen: Seen = Rc::default();

        let log = seen.clone();
        let doomed = world.spawn(
            ObjectBuilder::new("Doomed"),
            FnBehavior::new(move |world, me, event| {
                log.borrow_mut().push(me);
                if let Event::Step { .. } = event {
                    world.mark_for_delete(me)?;
                }
                Ok(true)
            })
            .with_interest(EventKind::Step)
            .with_interest(EventKind::Out),
        )?;
        let survivor = spawn_recorders(&mut world, &seen, 1)[0];

        world.dispatch(&Event::Step { count: 0 });
        // still functional for the rest of the frame
        assert!(world.contains(doomed));
        assert_eq!(world.dispatch(&Event::Out), 1);

        world.update();
        assert!(!world.contains(doomed));
        seen.borrow_mut().clear();
        world.dispatch(&Event::Step { count: 1 });
        assert_eq!(*seen.borrow(), vec![survivor]);
        Ok(())
    }

    #[test]
    fn test_double_mark_from_two_handlers() -> Result<()> {
        let mut world = WorldManager::default();
        let target = world.spawn(ObjectBuilder::new("Target"), Inert)?;
        for _ in 0..2 {
            world.spawn(
                ObjectBuilder::new("Hunter"),
                FnBehavior::new(move |world, _, _| {
                    world.mark_for_delete(target)?;
                    Ok(true)
                })
                .with_interest(EventKind::Step),
            )?;
        }

        assert_eq!(world.dispatch(&Event::Step { count: 0 }), 2);
        assert_eq!(world.pending_deletions().len(), 1);
        world.update();
        assert!(!world.contains(target));
        assert_eq!(world.object_count(), 2);
        Ok(())
    }

    #[test]
    fn test_spawn_during_dispatch_waits_for_next_event() -> Result<()> {
        let mut world = WorldManager::default();
        let seen: Seen = Rc::default();

        let log = seen.clone();
        let spawned = Rc::new(RefCell::new(false));
        let flag = spawned.clone();
        world.spawn(
            ObjectBuilder::new("Spawner"),
            FnBehavior::new(move |world, _, _| {
                if !*flag.borrow() {
                    *flag.borrow_mut() = true;
                    world.spawn(ObjectBuilder::new("Child"), step_recorder(&log))?;
                }
                Ok(true)
            })
            .with_interest(EventKind::Step),
        )?;

        world.dispatch(&Event::Step { count: 0 });
        assert!(seen.borrow().is_empty());
        world.dispatch(&Event::Step { count: 1 });
        assert_eq!(seen.borrow().len(), 1);
        Ok(())
    }

    #[test]
    fn test_deactivate_unvisited_during_dispatch() -> Result<()> {
        let mut world = WorldManager::default();
        let seen: Seen = Rc::default();
        let sleeper: Rc<RefCell<Option<EntityId>>> = Rc::default();

        let target = sleeper.clone();
        world.spawn(
            ObjectBuilder::new("Sandman"),
            FnBehavior::new(move |world, _, _| {
                if let Some(id) = *target.borrow() {
                    world.set_active(id, false)?;
                }
                Ok(true)
            })
            .with_interest(EventKind::Step),
        )?;
        let ids = spawn_recorders(&mut world, &seen, 1);
        *sleeper.borrow_mut() = Some(ids[0]);

        assert_eq!(world.dispatch(&Event::Step { count: 0 }), 1);
        assert!(seen.borrow().is_empty());
        assert!(world.scene().inactive_objects().contains(ids[0]));
        Ok(())
    }

    #[test]
    fn test_bounce_off_wall() -> Result<()> {
        // reverses direction when it hits something
        let mut world = WorldManager::default();
        let ball = world.spawn(
            ObjectBuilder::new("Ball")
                .at(10.0, 5.0)
                .velocity(Vector::new(1.0, 0.0)),
            FnBehavior::new(|world, me, event| {
                if let Event::Collision { mover, .. } = event {
                    if *mover == me {
                        if let Some(ball) = world.get_mut(me) {
                            let velocity = ball.velocity();
                            ball.set_velocity(-velocity);
                        }
                    }
                }
                Ok(true)
            }),
        )?;
        world.spawn(ObjectBuilder::new("Wall").at(13.0, 5.0), Inert)?;

        let positions: Vec<f32> = (0..4)
            .map(|_| {
                world.update();
                world.get(ball).map_or(f32::NAN, |b| b.position.x)
            })
            .collect();
        assert_eq!(positions, vec![11.0, 11.0, 10.0, 9.0]);
        Ok(())
    }

    #[test]
    fn test_soft_blocks_no_soft_mover_in_update() -> Result<()> {
        let mut world = WorldManager::default();
        let picky = world.spawn(
            ObjectBuilder::new("Picky")
                .at(5.0, 5.0)
                .velocity(Vector::new(0.0, 1.0))
                .no_soft(true),
            Inert,
        )?;
        world.spawn(
            ObjectBuilder::new("Mud")
                .at(5.0, 8.0)
                .solidness(Solidness::Soft),
            Inert,
        )?;

        world.update();
        world.update();
        world.update();
        assert_eq!(world.get(picky).map(|o| o.position), Some(Vector::new(5.0, 6.0)));
        Ok(())
    }

    #[test]
    fn test_animated_sprite_in_world() -> Result<()> {
        let resources = ResourceManager::default();
        let frames = vec![
            Frame::from_rows(1, &["a"]).unwrap(),
            Frame::from_rows(1, &["b"]).unwrap(),
        ];
        resources.register(Sprite::new("blink", 1, 1, frames, ColorPair::default(), 2))?;
        let mut world = WorldManager::new(&EngineConfig::default(), resources);
        world.spawn(ObjectBuilder::new("Light").at(4.0, 2.0).sprite("blink"), Inert)?;

        let mut display = MemoryDisplay::default();
        let mut drawn = String::new();
        for _ in 0..6 {
            display.clear();
            world.draw(&mut display);
            display.render()?;
            drawn.extend(display.screen().char_at(4, 2));
        }
        assert_eq!(drawn, "aabbaa");
        Ok(())
    }
}
