//! Serialisation of rectangular regions of locally stored blocks.
use crate::grid::{AxisOrder, Block, Layout};

/// Visit the rows of `region` within `layout`, with the axes of `order` varying from fastest to
/// slowest. Each row is given as its first local offset, its stride and its length.
fn for_each_row(
    layout: &Layout,
    region: &Block,
    order: AxisOrder,
    mut f: impl FnMut(usize, usize, usize),
) {
    let strides = layout.strides();
    let [a, b, c] = order.0;
    let base = layout.offset(region.lo);
    let len = region.extent(a);

    for kc in 0..region.extent(c) {
        for kb in 0..region.extent(b) {
            f(base + kc * strides[c] + kb * strides[b], strides[a], len);
        }
    }
}

/// Copy `region` of `src`, stored in `layout`, into the front of `out` serialised in `order`.
/// Returns the number of elements written.
pub(crate) fn pack<T: Copy>(
    src: &[T],
    layout: &Layout,
    region: &Block,
    order: AxisOrder,
    out: &mut [T],
) -> usize {
    let mut n = 0;
    for_each_row(layout, region, order, |start, stride, len| {
        if stride == 1 {
            out[n..n + len].copy_from_slice(&src[start..start + len]);
        } else {
            for (i, value) in out[n..n + len].iter_mut().enumerate() {
                *value = src[start + i * stride];
            }
        }
        n += len;
    });
    n
}

/// Inverse of [`pack`], scatter the front of `buf`, serialised in `order`, into `region` of `dst`.
/// Returns the number of elements read.
pub(crate) fn unpack<T: Copy>(
    buf: &[T],
    layout: &Layout,
    region: &Block,
    order: AxisOrder,
    dst: &mut [T],
) -> usize {
    let mut n = 0;
    for_each_row(layout, region, order, |start, stride, len| {
        if stride == 1 {
            dst[start..start + len].copy_from_slice(&buf[n..n + len]);
        } else {
            for (i, value) in buf[n..n + len].iter().enumerate() {
                dst[start + i * stride] = *value;
            }
        }
        n += len;
    });
    n
}
