use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glyph_engine::prelude::*;
use glyph_engine::{EventKind, ObjectList};

fn world_with_movers(n: usize) -> WorldManager {
    let mut world = WorldManager::default();
    world.set_boundary(BoundingBox::with_extent(1000.0, 1000.0));
    for i in 0..n {
        let x = (i % 100) as f32 * 10.0;
        let y = (i / 100) as f32 * 10.0;
        world
            .spawn(
                ObjectBuilder::new("Mover")
                    .at(x, y)
                    .velocity(Vector::new(0.5, 0.0)),
                Inert,
            )
            .unwrap();
    }
    world
}

fn bench_update_1000_movers(c: &mut Criterion) {
    c.bench_function("update_1000_movers", |b| {
        b.iter_batched(
            || world_with_movers(1000),
            |mut world| {
                world.update();
                black_box(world.object_count())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_dispatch_step_100_subscribers(c: &mut Criterion) {
    let mut world = WorldManager::default();
    for _ in 0..100 {
        world
            .spawn(
                ObjectBuilder::new("Listener"),
                FnBehavior::new(|_, _, _| Ok(true)).with_interest(EventKind::Step),
            )
            .unwrap();
    }
    let mut count = 0;
    c.bench_function("dispatch_step_100_subs", |b| {
        b.iter(|| {
            count += 1;
            black_box(world.dispatch(&Event::Step { count }))
        })
    });
}

fn bench_collision_query(c: &mut Criterion) {
    let world = world_with_movers(1000);
    let first = world.objects_of_type("Mover")[0];
    c.bench_function("get_collisions_1000_solid", |b| {
        b.iter(|| black_box(world.get_collisions(first, Vector::new(500.0, 5.0)).unwrap()))
    });
}

fn bench_object_list_churn(c: &mut Criterion) {
    let ids: Vec<EntityId> = (0..1000).map(|_| EntityId::next()).collect();
    c.bench_function("object_list_insert_remove_1000", |b| {
        b.iter(|| {
            let mut list = ObjectList::new();
            for &id in &ids {
                list.insert(id).unwrap();
            }
            for &id in ids.iter().step_by(2) {
                list.remove(id).unwrap();
            }
            black_box(list.len())
        })
    });
}

fn bench_draw_full_view(c: &mut Criterion) {
    let resources = ResourceManager::default();
    let frame = Frame::from_rows(3, &["<#>"]).unwrap();
    resources
        .register(Sprite::new("ship", 3, 1, vec![frame], ColorPair::default(), 1))
        .unwrap();
    let mut world = WorldManager::new(&EngineConfig::default(), resources);
    for i in 0..300 {
        world
            .spawn(
                ObjectBuilder::new("Ship")
                    .at((i % 33) as f32 * 3.0, (i / 33) as f32 * 3.0)
                    .sprite("ship"),
                Inert,
            )
            .unwrap();
    }
    let mut display = MemoryDisplay::default();
    c.bench_function("draw_300_sprites", |b| {
        b.iter(|| {
            display.clear();
            black_box(world.draw(&mut display))
        })
    });
}

criterion_group!(
    benches,
    bench_update_1000_movers,
    bench_dispatch_step_100_subscribers,
    bench_collision_query,
    bench_object_list_churn,
    bench_draw_full_view
);
criterion_main!(benches);
