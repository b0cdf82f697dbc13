use slotmap::new_key_type;

new_key_type! {
    /// Identifies a material inside a single [`DependencyGraph`].
    ///
    /// Keys are only meaningful for the graph that issued them; the stable
    /// identity of a material across calls is its uuid string.
    ///
    /// [`DependencyGraph`]: crate::graph::DependencyGraph
    pub struct MaterialKey;
}
