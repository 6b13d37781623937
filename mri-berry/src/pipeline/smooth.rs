use crate::filter::gradient_anisotropic_diffusion;
use crate::{GeometryAttr, SmoothingParams, Volume};

/// 保边平滑: 梯度各向异性扩散.
///
/// 平滑在体素分辨率 (毫米) 下进行, 输出几何信息与输入一致.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Smoother {
    params: SmoothingParams,
}

impl Smoother {
    /// 以给定扩散参数创建平滑器.
    #[inline]
    pub fn new(params: SmoothingParams) -> Self {
        Self { params }
    }

    /// 平滑 `volume`, 返回新的扫描.
    pub fn run(&self, volume: &Volume) -> Volume {
        let data = gradient_anisotropic_diffusion(volume.data(), volume.pix_dim(), &self.params);
        volume.derive(data)
    }
}

#[cfg(test)]
mod tests {
    use super::Smoother;
    use crate::{GeometryAttr, SmoothingParams, Volume};
    use ndarray::Array3;

    #[test]
    fn test_smoother_keeps_geometry_and_input() {
        let data = Array3::from_shape_fn((4, 5, 6), |(z, h, w)| ((z * 7 + h * 3 + w) % 5) as f32 * 100.0);
        let v = Volume::new(data.clone(), [2.0, 1.0, 1.0]).unwrap();
        let out = Smoother::default().run(&v);
        assert_eq!(out.geometry(), v.geometry());
        assert_eq!(v.data(), data.view());
        assert_ne!(out.data(), v.data());
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let data = Array3::from_shape_fn((2, 3, 3), |(z, h, w)| (z + h + w) as f32);
        let v = Volume::new(data, [1.0; 3]).unwrap();
        let params = SmoothingParams {
            iterations: 0,
            ..Default::default()
        };
        assert_eq!(Smoother::new(params).run(&v).data(), v.data());
    }
}
