//! Conversion between interleaved complex buffers and planar storage.
use num_complex::Complex;

/// Split `src` into real parts, written to `dst[..n]`, and imaginary parts, written to
/// `dst[n..2n]`, where `n = src.len()`.
pub fn deinterleave<T: Copy>(src: &[Complex<T>], dst: &mut [T]) {
    let (re, im) = dst[..2 * src.len()].split_at_mut(src.len());
    for ((z, r), i) in src.iter().zip(re.iter_mut()).zip(im.iter_mut()) {
        *r = z.re;
        *i = z.im;
    }
}

/// Inverse of [`deinterleave`], rebuild `dst.len()` complex numbers from planar `src`.
pub fn interleave<T: Copy>(src: &[T], dst: &mut [Complex<T>]) {
    let (re, im) = src[..2 * dst.len()].split_at(dst.len());
    for ((z, &r), &i) in dst.iter_mut().zip(re.iter()).zip(im.iter()) {
        z.re = r;
        z.im = i;
    }
}
