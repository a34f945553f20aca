//! 算子接口，以及默认算子的实现（两种杂交与一种变异）
//!

use crate::engine::Membership;
use rand::Rng;

pub mod default;

pub trait Crossover {
    /// 由两个极大独立集产生一个新的极大独立集
    fn crossover<'g, R: Rng + ?Sized>(
        &self,
        a: &Membership<'g>,
        b: &Membership<'g>,
        rng: &mut R,
    ) -> Membership<'g>;
}

pub trait Mutate {
    /// 对一个极大独立集做随机扰动，结束时仍是极大独立集；返回加入与移除的顶点总数
    fn mutate<R: Rng + ?Sized>(&self, child: &mut Membership, rng: &mut R) -> usize;
}
