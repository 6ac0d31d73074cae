use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Clip token sequences to `seq_length` and pad the remainder with the
/// padding index (0), producing a `[batch_size, seq_length]` tensor.
/// Sequences longer than `seq_length` are truncated from the end.
pub fn pad_to<B: Backend>(
    tokens_list: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = tokens_list.len();

    let mut tensor = Tensor::zeros([batch_size, seq_length], device);

    for (index, mut tokens) in tokens_list.into_iter().enumerate() {
        tokens.truncate(seq_length);

        if tokens.is_empty() {
            continue;
        }

        let len = tokens.len();

        tensor = tensor.slice_assign(
            [index..index + 1, 0..len],
            Tensor::from_data(
                Data::new(
                    tokens.into_iter().map(|e| (e as i64).elem()).collect(),
                    Shape::new([1, len]),
                ),
                device,
            ),
        );
    }

    tensor
}

/// Select the final time step from a `[batch_size, seq_length, d_hidden]`
/// sequence of hidden states
pub fn last_step<B: Backend>(hidden: Tensor<B, 3>) -> Tensor<B, 2> {
    let [batch_size, seq_length, d_hidden] = hidden.dims();

    hidden
        .slice([0..batch_size, seq_length - 1..seq_length])
        .reshape([batch_size, d_hidden])
}
