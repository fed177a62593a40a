use tch::nn;

use super::network::Network;

const STEM_KERNEL: i64 = 3;
const RESIDUAL_KERNEL: i64 = 5;

/// Four conv + pool stages with residual blocks in between, then a two layer dense head.
///
/// Input is `[N, 1, L]`, output is `[N, num_classes]` logits.
pub fn resnet1d(vs: &nn::Path, network: &Network) -> nn::SequentialT {
    let mut seq = nn::seq_t();

    let mut c_in = network.in_channels;
    for (index, &c_out) in network.stage_widths.iter().enumerate() {
        seq = seq.add(stage(
            &vs.sub(format!("stage{index}")),
            c_in,
            c_out,
            network.residual_blocks,
        ));
        c_in = c_out;
    }

    seq.add_fn(|x| x.flatten(1, -1))
        .add(nn::linear(
            vs.sub("dense1"),
            network.flatten_size(),
            network.hidden_units,
            Default::default(),
        ))
        .add_fn(|x| x.relu())
        .add(nn::linear(
            vs.sub("dense2"),
            network.hidden_units,
            network.num_classes,
            Default::default(),
        ))
}

fn conv_bn(vs: &nn::Path, c_in: i64, c_out: i64, kernel: i64) -> nn::SequentialT {
    let conv1d_cfg = nn::ConvConfig {
        padding: kernel / 2,
        ..Default::default()
    };
    nn::seq_t()
        .add(nn::conv1d(vs.sub("conv"), c_in, c_out, kernel, conv1d_cfg))
        .add(nn::batch_norm1d(vs.sub("bn"), c_out, Default::default()))
}

/// Halves the length and moves to `c_out` channels, then refines at constant width.
fn stage(vs: &nn::Path, c_in: i64, c_out: i64, blocks: usize) -> nn::SequentialT {
    let mut seq = nn::seq_t()
        .add(conv_bn(&vs.sub("pre"), c_in, c_out, STEM_KERNEL))
        .add_fn(|x| x.relu().max_pool1d([2], [2], [0], [1], false));

    for block in 0..blocks {
        seq = seq.add(residual_block(&vs.sub(format!("res{block}")), c_out));
    }
    seq
}

/// `bn(conv(relu(bn(conv(x))))) + x`, shape preserving.
pub(crate) fn residual_block<'a>(vs: &nn::Path, channels: i64) -> nn::FuncT<'a> {
    let first = conv_bn(&vs.sub("b1"), channels, channels, RESIDUAL_KERNEL);
    let second = conv_bn(&vs.sub("b2"), channels, channels, RESIDUAL_KERNEL);
    nn::func_t(move |xs, train| {
        let ys = xs
            .apply_t(&first, train)
            .relu()
            .apply_t(&second, train);
        ys + xs
    })
}
