//! Shared fixtures for unit tests

use glam::{Vec3, Vec4};

use crate::host::{HostBlendShape, HostBlendShapeFrame, HostMesh, HostSubMesh, HostUv};
use crate::mesh::{BoneWeight, IndexFormat, MeshTopology};

// ============================================================================
// Test Meshes
// ============================================================================

/// Unit quad made of two triangles sharing the 0-2 diagonal
///
/// - 4 vertices with normals, tangents, colors, a 2D uv0 and skin weights
///   (1, 2, 1, 2 influences)
/// - `blink`: one frame at 100 moving vertex 2 down by 0.2
/// - `smile`: frames at 50 and 100 nudging vertices 0 and 1 along +X
pub fn quad_mesh() -> HostMesh {
    let positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    let mut uvs: [Option<HostUv>; 8] = Default::default();
    uvs[0] = Some(HostUv {
        dimension: 2,
        values: positions.iter().map(|p| Vec4::new(p.x, p.y, 0.0, 0.0)).collect(),
    });

    HostMesh {
        name: "quad".to_owned(),
        positions,
        normals: Some(vec![Vec3::Z; 4]),
        tangents: Some(vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4]),
        colors: Some(vec![
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [255, 255, 255, 255],
        ]),
        uvs,
        bones_per_vertex: Some(vec![1, 2, 1, 2]),
        bone_weights: vec![
            BoneWeight::new(0, 1.0),
            BoneWeight::new(0, 0.5),
            BoneWeight::new(1, 0.5),
            BoneWeight::new(1, 1.0),
            BoneWeight::new(0, 0.25),
            BoneWeight::new(1, 0.75),
        ],
        index_format: IndexFormat::U16,
        submeshes: vec![HostSubMesh {
            topology: MeshTopology::Triangles,
            indices: vec![0, 1, 2, 0, 2, 3],
        }],
        blend_shapes: vec![
            HostBlendShape {
                name: "blink".to_owned(),
                frames: vec![HostBlendShapeFrame::from_positions(
                    100.0,
                    vec![Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, -0.2, 0.0), Vec3::ZERO],
                )],
            },
            HostBlendShape {
                name: "smile".to_owned(),
                frames: vec![
                    HostBlendShapeFrame::from_positions(
                        50.0,
                        vec![
                            Vec3::new(0.01, 0.0, 0.0),
                            Vec3::new(0.02, 0.0, 0.0),
                            Vec3::ZERO,
                            Vec3::ZERO,
                        ],
                    ),
                    HostBlendShapeFrame::from_positions(
                        100.0,
                        vec![
                            Vec3::new(0.02, 0.0, 0.0),
                            Vec3::new(0.04, 0.0, 0.0),
                            Vec3::ZERO,
                            Vec3::ZERO,
                        ],
                    ),
                ],
            },
        ],
        ..HostMesh::default()
    }
}
