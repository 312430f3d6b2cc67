use crate::model::{LayoutGraph, RankDir};

/// Swaps node sizes for horizontal layouts so positioning can always work top-to-bottom.
pub fn adjust(g: &mut LayoutGraph) {
    if matches!(g.graph().rankdir, RankDir::LR | RankDir::RL) {
        swap_width_height(g);
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if matches!(rankdir, RankDir::BT | RankDir::RL) {
        reverse_y(g);
    }
    if matches!(rankdir, RankDir::LR | RankDir::RL) {
        swap_xy(g);
        swap_width_height(g);
    }
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| std::mem::swap(&mut n.width, &mut n.height));
}

fn reverse_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| {
        if let Some(y) = n.y {
            n.y = Some(-y);
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.y = -p.y;
        }
    });
}

fn swap_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| std::mem::swap(&mut n.x, &mut n.y));
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            std::mem::swap(&mut p.x, &mut p.y);
        }
    });
}
