use rayon::prelude::*;

use roofsight_image::Image;

/// Apply a function to each pixel of `src` and the matching pixel of `dst` in parallel over rows.
///
/// Both images must have the same size; the caller checks it.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Copy + Send + Sync,
    T2: Copy + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Mutate every pixel of an image in place, in parallel over rows.
pub fn par_pixels_mut<T, const C: usize>(img: &mut Image<T, C>, f: impl Fn(&mut [T]) + Send + Sync)
where
    T: Copy + Send + Sync,
{
    let cols = img.cols();
    if cols == 0 {
        return;
    }

    img.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .for_each(|row| row.chunks_exact_mut(C).for_each(&f));
}

/// Mutate every row of an image in place, in parallel, passing the row index.
pub fn par_rows_indexed_mut<T, const C: usize>(
    img: &mut Image<T, C>,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Copy + Send + Sync,
{
    let cols = img.cols();
    if cols == 0 {
        return;
    }

    img.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Mutate matching rows of two images together, in parallel, passing the row index.
///
/// Both images must have the same size; the caller checks it.
pub fn par_row_pairs_indexed_mut<T1, const C1: usize, T2, const C2: usize>(
    a: &mut Image<T1, C1>,
    b: &mut Image<T2, C2>,
    f: impl Fn(usize, &mut [T1], &mut [T2]) + Send + Sync,
) where
    T1: Copy + Send + Sync,
    T2: Copy + Send + Sync,
{
    let cols = a.cols();
    if cols == 0 {
        return;
    }

    a.as_slice_mut()
        .par_chunks_exact_mut(C1 * cols)
        .zip(b.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .enumerate()
        .for_each(|(y, (row_a, row_b))| f(y, row_a, row_b));
}
